//! Unified error type for Rochambeau.

use rochambeau_protocol::ProtocolError;
use rochambeau_room::RoomError;
use rochambeau_session::SessionError;
use rochambeau_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RochambeauError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session coordinator is gone.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room operation was rejected.
    #[error(transparent)]
    Room(#[from] RoomError),
}
