//! Every message that crosses the wire, as closed tagged enums.
//!
//! Both directions use internally tagged JSON with kebab-case tags and
//! camelCase fields:
//!
//! ```text
//! { "type": "join", "roomId": "482913", "name": "Alice" }
//! { "type": "round-result", "moves": [...], "winnerId": 1, "scores": [...] }
//! ```
//!
//! Inbound bytes are never deserialized straight into [`ClientMessage`].
//! They go through [`decode_client_message`](crate::decode_client_message),
//! which parses a loosely typed wire shape first and then validates it, so
//! an unknown move surfaces as [`ProtocolError::InvalidMove`] rather than a
//! generic decode failure.

use serde::{Deserialize, Serialize};

use crate::{
    Move, MoveEntry, ParticipantId, ParticipantInfo, ProtocolError, RoomId,
    RoomState, ScoreEntry,
};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// A validated request from a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Join (or create) a room. `None` asks the server to pick a code.
    Join { room_id: Option<RoomId>, name: String },
    /// Throw a move for the current round.
    Move { thrown: Move },
    /// Opt into a rematch.
    RematchRequest,
    /// Withdraw from a pending rematch.
    RematchCancel,
    /// Leave the current room.
    Leave,
    /// Free text for the other participant.
    Chat { text: String },
    /// Ask for a snapshot of the current room.
    RoomStatus,
}

/// What actually arrives on the wire, before validation.
///
/// `move` is kept as a raw string here so validation can tell a bad move
/// apart from a malformed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub(crate) enum WireClientMessage {
    Join {
        #[serde(default)]
        room_id: Option<String>,
        name: String,
    },
    Move {
        #[serde(rename = "move")]
        thrown: String,
    },
    RematchRequest,
    RematchCancel,
    Leave,
    Chat {
        text: String,
    },
    RoomStatus,
}

impl TryFrom<WireClientMessage> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(wire: WireClientMessage) -> Result<Self, Self::Error> {
        Ok(match wire {
            WireClientMessage::Join { room_id, name } => {
                let room_id = match room_id {
                    Some(raw) => Some(RoomId::parse(&raw)?),
                    None => None,
                };
                ClientMessage::Join { room_id, name }
            }
            WireClientMessage::Move { thrown } => ClientMessage::Move {
                thrown: thrown.parse()?,
            },
            WireClientMessage::RematchRequest => ClientMessage::RematchRequest,
            WireClientMessage::RematchCancel => ClientMessage::RematchCancel,
            WireClientMessage::Leave => ClientMessage::Leave,
            WireClientMessage::Chat { text } => ClientMessage::Chat { text },
            WireClientMessage::RoomStatus => ClientMessage::RoomStatus,
        })
    }
}

impl From<&ClientMessage> for WireClientMessage {
    fn from(msg: &ClientMessage) -> Self {
        match msg {
            ClientMessage::Join { room_id, name } => WireClientMessage::Join {
                room_id: room_id.as_ref().map(|id| id.as_str().to_owned()),
                name: name.clone(),
            },
            ClientMessage::Move { thrown } => WireClientMessage::Move {
                thrown: thrown.as_str().to_owned(),
            },
            ClientMessage::RematchRequest => WireClientMessage::RematchRequest,
            ClientMessage::RematchCancel => WireClientMessage::RematchCancel,
            ClientMessage::Leave => WireClientMessage::Leave,
            ClientMessage::Chat { text } => {
                WireClientMessage::Chat { text: text.clone() }
            }
            ClientMessage::RoomStatus => WireClientMessage::RoomStatus,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Whether a chat line came from a participant or from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    User,
    System,
}

/// Everything the server can tell a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent once when the socket is accepted.
    Connected {
        participant_id: ParticipantId,
        protocol_version: u32,
    },

    /// Join acknowledged; sent to the joiner only.
    RoomJoined {
        room_id: RoomId,
        participant_id: ParticipantId,
    },

    /// Join rejected, the room already holds two participants.
    RoomFull,

    /// The second participant arrived.
    BothJoined {
        participants: Vec<ParticipantInfo>,
        scores: Vec<ScoreEntry>,
    },

    /// Both moves are in and the round is resolved. `winner_id` is `None`
    /// on a tie. Scores are taken before any match-end reset.
    RoundResult {
        moves: Vec<MoveEntry>,
        winner_id: Option<ParticipantId>,
        scores: Vec<ScoreEntry>,
    },

    /// Someone reached the win threshold. Scores are the final ones; both
    /// are zero again once this has been sent.
    MatchEnd {
        winner_id: ParticipantId,
        scores: Vec<ScoreEntry>,
    },

    RematchRequested {
        requester_id: ParticipantId,
        name: String,
    },

    RematchCancelled {
        requester_id: ParticipantId,
        name: String,
    },

    /// Both participants agreed; a fresh round begins.
    RematchStart,

    /// The other participant left or disconnected.
    OpponentLeft { name: String, message: String },

    Chat {
        sender: String,
        text: String,
        kind: ChatKind,
    },

    /// Snapshot of the requester's room.
    RoomStatus {
        room_id: RoomId,
        state: RoomState,
        participants: Vec<ParticipantInfo>,
        scores: Vec<ScoreEntry>,
        rematch_votes: Vec<ParticipantId>,
    },

    /// A recoverable, participant-local failure. `code` follows HTTP
    /// conventions (400 bad request, 404 not found, 409 conflict).
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// Wire tag of this message, handy for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::RoomJoined { .. } => "room-joined",
            Self::RoomFull => "room-full",
            Self::BothJoined { .. } => "both-joined",
            Self::RoundResult { .. } => "round-result",
            Self::MatchEnd { .. } => "match-end",
            Self::RematchRequested { .. } => "rematch-requested",
            Self::RematchCancelled { .. } => "rematch-cancelled",
            Self::RematchStart => "rematch-start",
            Self::OpponentLeft { .. } => "opponent-left",
            Self::Chat { .. } => "chat",
            Self::RoomStatus { .. } => "room-status",
            Self::Error { .. } => "error",
        }
    }

    /// Builds an [`Error`](Self::Error) message.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> ParticipantId {
        ParticipantId(id)
    }

    #[test]
    fn test_server_message_round_result_json_shape() {
        let msg = ServerMessage::RoundResult {
            moves: vec![
                MoveEntry { participant_id: pid(1), thrown: Move::Rock },
                MoveEntry { participant_id: pid(2), thrown: Move::Scissors },
            ],
            winner_id: Some(pid(1)),
            scores: vec![
                ScoreEntry { participant_id: pid(1), score: 1 },
                ScoreEntry { participant_id: pid(2), score: 0 },
            ],
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "round-result");
        assert_eq!(json["winnerId"], 1);
        assert_eq!(json["moves"][1]["move"], "scissors");
        assert_eq!(json["scores"][0]["participantId"], 1);
        assert_eq!(json["scores"][0]["score"], 1);
    }

    #[test]
    fn test_server_message_tie_has_null_winner() {
        let msg = ServerMessage::RoundResult {
            moves: vec![],
            winner_id: None,
            scores: vec![],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["winnerId"].is_null());
    }

    #[test]
    fn test_server_message_unit_variants_carry_only_type() {
        let json = serde_json::to_value(ServerMessage::RematchStart).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "rematch-start" }));

        let json = serde_json::to_value(ServerMessage::RoomFull).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "room-full" }));
    }

    #[test]
    fn test_server_message_rematch_requested_json_shape() {
        let msg = ServerMessage::RematchRequested {
            requester_id: pid(4),
            name: "Bob".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "rematch-requested");
        assert_eq!(json["requesterId"], 4);
        assert_eq!(json["name"], "Bob");
    }

    #[test]
    fn test_server_message_chat_kind_lowercase() {
        let msg = ServerMessage::Chat {
            sender: "System".into(),
            text: "Bob has left the game".into(),
            kind: ChatKind::System,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "system");
    }

    #[test]
    fn test_server_message_kind_matches_wire_tag() {
        let msgs = [
            ServerMessage::RoomFull,
            ServerMessage::RematchStart,
            ServerMessage::error(404, "gone"),
            ServerMessage::OpponentLeft {
                name: "A".into(),
                message: "A has left the game".into(),
            },
        ];
        for msg in msgs {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }

    #[test]
    fn test_wire_join_without_room_id() {
        let wire: WireClientMessage =
            serde_json::from_str(r#"{"type":"join","name":"Alice"}"#).unwrap();
        let msg = ClientMessage::try_from(wire).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join { room_id: None, name: "Alice".into() }
        );
    }

    #[test]
    fn test_wire_move_rejects_unknown_move() {
        let wire: WireClientMessage =
            serde_json::from_str(r#"{"type":"move","move":"spock"}"#).unwrap();
        let err = ClientMessage::try_from(wire).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMove(_)));
    }
}
