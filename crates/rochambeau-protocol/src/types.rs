//! Identity and value types shared by every layer.
//!
//! These are the small building blocks that appear inside wire messages:
//! who a participant is, which room they're in, what move they threw, and
//! how scores are reported back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected participant.
///
/// The gateway derives it from the transport connection, so it is stable
/// for exactly one connection. `#[serde(transparent)]` keeps it a plain
/// number on the wire: `ParticipantId(42)` is just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room code, chosen by the client or generated by the registry.
///
/// Codes are opaque strings. Construct them with [`RoomId::parse`] to get
/// the trimming and blank-check the coordinator relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Builds a room id from client input.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the code is empty or
    /// only whitespace.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "room id must not be blank".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code is blank. Only possible for ids that
    /// were deserialized without going through [`RoomId::parse`].
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for RoomId {
    fn from(code: u32) -> Self {
        Self(code.to_string())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// One of the three throws. Lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// Every valid move, in a fixed order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Wire spelling of the move.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
        }
    }

    /// Returns `true` if `self` beats `other`.
    ///
    /// Rock beats Scissors, Scissors beats Paper, Paper beats Rock.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors)
                | (Self::Scissors, Self::Paper)
                | (Self::Paper, Self::Rock)
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rock" => Ok(Self::Rock),
            "paper" => Ok(Self::Paper),
            "scissors" => Ok(Self::Scissors),
            other => Err(ProtocolError::InvalidMove(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Room occupancy
// ---------------------------------------------------------------------------

/// Occupancy state of a room, derived from how many participants it holds.
///
/// ```text
/// Empty → WaitingForOpponent → Full
///   ↑            ↑   │           │
///   └────────────┴───┴───────────┘   (leave / disconnect)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomState {
    Empty,
    WaitingForOpponent,
    Full,
}

impl RoomState {
    /// Maps a participant count onto the occupancy state.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::Empty,
            1 => Self::WaitingForOpponent,
            _ => Self::Full,
        }
    }

    /// Returns `true` if another participant may join.
    pub fn is_joinable(self) -> bool {
        !matches!(self, Self::Full)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::Full => write!(f, "Full"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload entries
// ---------------------------------------------------------------------------

/// A participant as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub name: String,
}

/// One participant's score. Lists of these are always in join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub participant_id: ParticipantId,
    pub score: u32,
}

/// The move a participant threw in a resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    pub participant_id: ParticipantId,
    #[serde(rename = "move")]
    pub thrown: Move,
}

/// Who should receive a server message.
///
/// Room operations return `(Recipient, ServerMessage)` pairs; the
/// coordinator resolves them against the room roster *after* the
/// operation, so `All` after a leave means "whoever is still there".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every participant currently in the room.
    All,
    /// One specific participant, member or not.
    Participant(ParticipantId),
}
