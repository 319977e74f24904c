//! # Rochambeau
//!
//! A server that pairs two remote participants into a rock-paper-scissors
//! match, collects their moves simultaneously, scores rounds, and runs the
//! rematch handshake.
//!
//! This meta crate wires the layers together and exposes a single server
//! type. The interesting state lives below it:
//!
//! ```text
//! rochambeau            ← server builder, accept loop, connection handler
//!   rochambeau-session  ← coordinator actor, outbox
//!   rochambeau-room     ← rooms, resolver, scoring, rematch negotiation
//!   rochambeau-protocol ← wire messages and codec
//!   rochambeau-transport← WebSocket connections
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rochambeau::prelude::*;
//!
//! # async fn run() -> Result<(), RochambeauError> {
//! let server = RochambeauServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod timer;

pub use error::RochambeauError;
pub use server::{DEFAULT_HANDSHAKE_TIMEOUT, RochambeauServer, RochambeauServerBuilder};

pub use rochambeau_protocol as protocol;
pub use rochambeau_room as room;
pub use rochambeau_session as session;
pub use rochambeau_transport as transport;

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{RochambeauError, RochambeauServer, RochambeauServerBuilder};
    pub use rochambeau_protocol::{
        ChatKind, ClientMessage, Codec, JsonCodec, Move, PROTOCOL_VERSION,
        ParticipantId, RoomId, RoomState, ServerMessage,
    };
    pub use rochambeau_room::{MatchConfig, RoomError};
    pub use rochambeau_session::{CoordinatorHandle, SessionError};
}
