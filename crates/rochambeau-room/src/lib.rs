//! Rooms for Rochambeau.
//!
//! Everything in this crate is plain synchronous state with no I/O. A
//! [`Room`] seats two participants, holds their moves until both have
//! thrown, scores the round, and negotiates rematches. Operations return
//! `(Recipient, ServerMessage)` pairs for the caller to deliver.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms on first join, drops them when empty
//! - [`Room`]: roster, scores, pending moves, rematch votes
//! - [`resolve`] / [`resolve_round`]: the rock-paper-scissors rule
//! - [`MatchController`]: scoring and match-end detection
//! - [`RematchNegotiator`]: the two-vote rematch handshake
//! - [`MatchConfig`]: win threshold and rematch vote timeout
//!
//! ```text
//! Session coordinator → RoomRegistry → Room
//!                                       ├─ resolve_round
//!                                       ├─ MatchController
//!                                       └─ RematchNegotiator
//! ```

mod config;
mod controller;
mod error;
mod registry;
mod rematch;
mod resolve;
mod room;

pub use config::{MatchConfig, ROOM_CAPACITY};
pub use controller::MatchController;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use rematch::{RematchNegotiator, RematchState, VoteOutcome};
pub use resolve::{Resolution, RoundOutcome, resolve, resolve_round};
pub use room::{LeaveReason, Outbound, Participant, Room};

pub use rochambeau_protocol::{Recipient, RoomState};
