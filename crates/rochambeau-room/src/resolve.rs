//! The round resolver: a pure function over two moves.

use rochambeau_protocol::{Move, ParticipantId};

/// Result of comparing two moves, positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Tie,
    FirstWins,
    SecondWins,
}

/// Outcome of a round in terms of participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Win(ParticipantId),
    Tie,
}

impl RoundOutcome {
    /// The round winner, or `None` on a tie.
    pub fn winner(self) -> Option<ParticipantId> {
        match self {
            Self::Win(id) => Some(id),
            Self::Tie => None,
        }
    }
}

/// Resolves one round.
pub fn resolve(first: Move, second: Move) -> Resolution {
    if first == second {
        Resolution::Tie
    } else if first.beats(second) {
        Resolution::FirstWins
    } else {
        Resolution::SecondWins
    }
}

/// Resolves one round between two identified participants.
pub fn resolve_round(
    (first_id, first): (ParticipantId, Move),
    (second_id, second): (ParticipantId, Move),
) -> RoundOutcome {
    match resolve(first, second) {
        Resolution::Tie => RoundOutcome::Tie,
        Resolution::FirstWins => RoundOutcome::Win(first_id),
        Resolution::SecondWins => RoundOutcome::Win(second_id),
    }
}
