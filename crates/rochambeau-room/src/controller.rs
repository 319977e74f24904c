//! The match controller: turns a resolved round into score changes and
//! the messages that report them.
//!
//! Order is fixed and observable by clients:
//!
//! ```text
//! resolve → update score → round-result → check threshold → match-end + reset
//! ```
//!
//! so a round that ends a match still reports the pre-reset scores in its
//! `round-result`, followed by `match-end`.

use rochambeau_protocol::{MoveEntry, ParticipantId, ScoreEntry, ServerMessage};

use crate::Participant;
use crate::resolve::RoundOutcome;

/// Applies round outcomes against a win threshold.
#[derive(Debug, Clone, Copy)]
pub struct MatchController {
    win_threshold: u32,
}

impl MatchController {
    pub fn new(win_threshold: u32) -> Self {
        Self { win_threshold }
    }

    /// Scores a resolved round and returns the messages to broadcast.
    ///
    /// Always yields a `RoundResult`; yields a `MatchEnd` after it when the
    /// winner reached the threshold, in which case every score in
    /// `participants` is reset to 0.
    pub fn settle(
        &self,
        participants: &mut [Participant],
        moves: Vec<MoveEntry>,
        outcome: RoundOutcome,
    ) -> Vec<ServerMessage> {
        if let RoundOutcome::Win(winner) = outcome {
            if let Some(p) = participants.iter_mut().find(|p| p.id == winner) {
                p.score += 1;
            }
        }

        let mut out = vec![ServerMessage::RoundResult {
            moves,
            winner_id: outcome.winner(),
            scores: scores_of(participants),
        }];

        if let Some(winner_id) = self.match_winner(participants) {
            out.push(ServerMessage::MatchEnd {
                winner_id,
                scores: scores_of(participants),
            });
            for p in participants.iter_mut() {
                p.score = 0;
            }
        }

        out
    }

    /// The first participant, in join order, whose score reached the
    /// threshold.
    pub fn match_winner(&self, participants: &[Participant]) -> Option<ParticipantId> {
        participants
            .iter()
            .find(|p| p.score >= self.win_threshold)
            .map(|p| p.id)
    }
}

/// Scores in join order.
pub(crate) fn scores_of(participants: &[Participant]) -> Vec<ScoreEntry> {
    participants
        .iter()
        .map(|p| ScoreEntry {
            participant_id: p.id,
            score: p.score,
        })
        .collect()
}
