//! Rematch negotiation: both participants must agree before a fresh
//! round starts.
//!
//! ```text
//! Idle ──(vote)──→ AwaitingVotes ──(last vote)──→ Starting ──→ Idle
//!                        │
//!                        └──(cancel / leave / timeout)──→ Cancelled ──→ Idle
//! ```
//!
//! `Starting` and `Cancelled` are instantaneous: they are reported as
//! [`VoteOutcome::Agreed`] and by [`RematchNegotiator::withdraw`] returning
//! `true`, and the negotiator is back in `Idle` by the time the call
//! returns.

use rochambeau_protocol::ParticipantId;

use crate::{ROOM_CAPACITY, RoomError};

/// Observable state of a room's rematch negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchState {
    Idle,
    AwaitingVotes,
}

/// What a single vote did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote recorded, still waiting on the opponent.
    Recorded,
    /// This participant had already voted; nothing changed.
    Duplicate,
    /// Every participant has voted; votes are cleared and a rematch starts.
    Agreed,
}

/// Per-room vote set.
#[derive(Debug, Clone, Default)]
pub struct RematchNegotiator {
    votes: Vec<ParticipantId>,
}

impl RematchNegotiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RematchState {
        if self.votes.is_empty() {
            RematchState::Idle
        } else {
            RematchState::AwaitingVotes
        }
    }

    /// Participants who have voted, in voting order.
    pub fn votes(&self) -> &[ParticipantId] {
        &self.votes
    }

    pub fn has_voted(&self, participant: ParticipantId) -> bool {
        self.votes.contains(&participant)
    }

    /// Records a vote from `voter`, a member of `roster`.
    ///
    /// A rematch needs a full room: a lone participant's vote is recorded
    /// but can never start one by itself.
    ///
    /// # Errors
    /// Returns [`RoomError::RoundInProgress`] if `round_in_progress` is set
    /// (some participant holds an unresolved move).
    pub fn vote(
        &mut self,
        voter: ParticipantId,
        roster: &[ParticipantId],
        round_in_progress: bool,
    ) -> Result<VoteOutcome, RoomError> {
        if round_in_progress {
            return Err(RoomError::RoundInProgress);
        }
        if self.has_voted(voter) {
            return Ok(VoteOutcome::Duplicate);
        }
        self.votes.push(voter);

        let everyone_agrees = roster.len() == ROOM_CAPACITY
            && roster.iter().all(|p| self.votes.contains(p));
        if everyone_agrees {
            self.votes.clear();
            Ok(VoteOutcome::Agreed)
        } else {
            Ok(VoteOutcome::Recorded)
        }
    }

    /// Cancels the pending negotiation. Returns `true` if there was one.
    pub fn withdraw(&mut self) -> bool {
        let had_votes = !self.votes.is_empty();
        self.votes.clear();
        had_votes
    }
}
