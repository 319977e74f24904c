//! Error types for the session layer.

use rochambeau_room::RoomError;

/// Errors that can occur while coordinating sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A room operation was rejected. The room is unchanged.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The coordinator task has stopped, so the command could not be
    /// delivered or its reply never arrived.
    #[error("session coordinator is unavailable")]
    Unavailable,
}
