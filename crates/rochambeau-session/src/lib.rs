//! Session coordination for Rochambeau.
//!
//! This crate is where participant events meet rooms:
//!
//! 1. **Coordination**: binding each participant to one room and routing
//!    their requests to it ([`SessionCoordinator`])
//! 2. **Delivery**: getting room events back out to connections
//!    ([`Outbox`] trait, [`ChannelOutbox`])
//! 3. **Serialization**: running the coordinator as a single actor task so
//!    room mutations never interleave ([`spawn_coordinator`],
//!    [`CoordinatorHandle`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Connection handlers (above)  ← forward decoded ClientMessages
//!     ↕
//! Session Layer (this crate)   ← bindings, dispatch, delivery
//!     ↕
//! Room Layer (below)           ← rooms, rounds, scores, rematches
//! ```

mod actor;
mod coordinator;
mod error;
mod outbox;

pub use actor::{CoordinatorHandle, spawn_coordinator, spawn_coordinator_with_capacity};
pub use coordinator::{Binding, SessionCoordinator, error_reply};
pub use error::SessionError;
pub use outbox::{ChannelOutbox, OutboundSender, Outbox};
