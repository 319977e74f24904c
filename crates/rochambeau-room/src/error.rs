//! Error types for the room layer.

use rochambeau_protocol::{ParticipantId, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is local to the participant that caused it: the failed
/// operation leaves the room exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (stale or unknown code).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already holds two participants.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The participant is bound to a room and tried to join another one.
    #[error("participant {0} already in room {1}")]
    AlreadyInRoom(ParticipantId, RoomId),

    /// The participant has no room binding (or is not in this room).
    #[error("participant {0} is not in a room")]
    NotInRoom(ParticipantId),

    /// A rematch was requested while a move is outstanding.
    #[error("cannot request a rematch during an active round")]
    RoundInProgress,

    /// The participant already threw a move this round. The first move
    /// stands.
    #[error("participant {0} already submitted a move this round")]
    MoveAlreadySubmitted(ParticipantId),

    /// The room code is blank.
    #[error("invalid room id")]
    InvalidRoomId,
}
