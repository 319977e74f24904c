//! A single two-participant room.
//!
//! A room owns its roster, each participant's score and pending move, and
//! the rematch vote set. It is a plain synchronous value: every operation
//! takes `&mut self`, mutates the room in one step, and returns the
//! messages that step produced as `(Recipient, ServerMessage)` pairs. The
//! caller decides how to deliver them, and is expected to serialize calls
//! so two operations never interleave on the same room.
//!
//! A failed operation returns `Err` and leaves the room untouched.

use rochambeau_protocol::{
    ChatKind, Move, MoveEntry, ParticipantId, ParticipantInfo, Recipient,
    RoomId, RoomState, ScoreEntry, ServerMessage,
};

use crate::controller::{MatchController, scores_of};
use crate::rematch::{RematchNegotiator, RematchState, VoteOutcome};
use crate::resolve::resolve_round;
use crate::{MatchConfig, ROOM_CAPACITY, RoomError};

/// Messages produced by one room operation, in emission order.
pub type Outbound = Vec<(Recipient, ServerMessage)>;

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One seat in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub(crate) id: ParticipantId,
    pub(crate) name: String,
    pub(crate) score: u32,
    pub(crate) pending_move: Option<Move>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            pending_move: None,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rounds won in the current match.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The move thrown this round, if any. Cleared once the round resolves.
    pub fn pending_move(&self) -> Option<Move> {
        self.pending_move
    }

    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Why a participant is leaving. Only changes the wording of the system
/// chat line the room broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// The participant asked to leave.
    Left,
    /// The participant's connection dropped.
    Disconnected,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    /// Join order. Never longer than [`ROOM_CAPACITY`].
    participants: Vec<Participant>,
    rematch: RematchNegotiator,
    controller: MatchController,
}

impl Room {
    /// Creates an empty room.
    pub fn new(id: RoomId, config: &MatchConfig) -> Self {
        Self {
            id,
            participants: Vec::with_capacity(ROOM_CAPACITY),
            rematch: RematchNegotiator::new(),
            controller: MatchController::new(config.win_threshold),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn state(&self) -> RoomState {
        RoomState::from_count(self.participants.len())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == participant)
    }

    pub fn participant(&self, participant: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant)
    }

    /// Participants in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Member ids in join order.
    pub fn roster(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Scores in join order.
    pub fn scores(&self) -> Vec<ScoreEntry> {
        scores_of(&self.participants)
    }

    pub fn rematch_votes(&self) -> &[ParticipantId] {
        self.rematch.votes()
    }

    pub fn rematch_state(&self) -> RematchState {
        self.rematch.state()
    }

    /// Returns `true` while any participant holds an unresolved move.
    pub fn round_in_progress(&self) -> bool {
        self.participants.iter().any(|p| p.pending_move.is_some())
    }

    /// Seats a participant.
    ///
    /// If `participant` already holds a seat, the stale entry is dropped
    /// first (its score with it), so a reconnect never counts as a third
    /// participant. Any membership change voids both pending moves and the
    /// rematch vote set.
    ///
    /// The joiner always gets `RoomJoined`; when this join fills the room,
    /// everyone gets `BothJoined`.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] if two other participants are seated.
    pub fn join(
        &mut self,
        participant: ParticipantId,
        name: impl Into<String>,
    ) -> Result<Outbound, RoomError> {
        let rejoining = self.contains(participant);
        if !rejoining && !self.state().is_joinable() {
            return Err(RoomError::RoomFull(self.id.clone()));
        }
        if rejoining {
            self.participants.retain(|p| p.id != participant);
            tracing::debug!(
                room_id = %self.id,
                %participant,
                "dropped stale seat before rejoin"
            );
        }

        self.participants.push(Participant::new(participant, name));
        self.reset_round();

        tracing::info!(
            room_id = %self.id,
            %participant,
            players = self.participants.len(),
            "participant joined"
        );

        let mut out = vec![(
            Recipient::Participant(participant),
            ServerMessage::RoomJoined {
                room_id: self.id.clone(),
                participant_id: participant,
            },
        )];
        if self.state() == RoomState::Full {
            out.push((
                Recipient::All,
                ServerMessage::BothJoined {
                    participants: self.participants.iter().map(Participant::info).collect(),
                    scores: self.scores(),
                },
            ));
        }
        Ok(out)
    }

    /// Removes a participant, voiding both pending moves and any rematch
    /// votes. Whoever remains is told with `OpponentLeft` and a system chat
    /// line.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `participant` holds no seat here.
    pub fn leave(
        &mut self,
        participant: ParticipantId,
        reason: LeaveReason,
    ) -> Result<Outbound, RoomError> {
        let index = self
            .participants
            .iter()
            .position(|p| p.id == participant)
            .ok_or(RoomError::NotInRoom(participant))?;
        let departed = self.participants.remove(index);
        self.reset_round();

        tracing::info!(
            room_id = %self.id,
            %participant,
            ?reason,
            players = self.participants.len(),
            "participant left"
        );

        let name = departed.name;
        let text = match reason {
            LeaveReason::Left => format!("{name} has left the game"),
            LeaveReason::Disconnected => {
                format!("{name} has disconnected from the game")
            }
        };
        Ok(vec![
            (
                Recipient::All,
                ServerMessage::OpponentLeft {
                    message: format!("{name} has left the game"),
                    name,
                },
            ),
            (
                Recipient::All,
                ServerMessage::Chat {
                    sender: "System".to_owned(),
                    text,
                    kind: ChatKind::System,
                },
            ),
        ])
    }

    /// Records a move for the current round.
    ///
    /// The move is held until the room is full and both participants have
    /// thrown; the round then resolves, both moves are cleared, and the
    /// result (plus `MatchEnd` if a score reached the threshold) is
    /// returned for everyone.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] if `participant` holds no seat here.
    /// - [`RoomError::MoveAlreadySubmitted`] if they already threw this
    ///   round. The first move stands.
    pub fn submit_move(
        &mut self,
        participant: ParticipantId,
        thrown: Move,
    ) -> Result<Outbound, RoomError> {
        let seat = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant)
            .ok_or(RoomError::NotInRoom(participant))?;
        if seat.pending_move.is_some() {
            return Err(RoomError::MoveAlreadySubmitted(participant));
        }
        seat.pending_move = Some(thrown);
        tracing::debug!(room_id = %self.id, %participant, %thrown, "move held");

        let (first, second) = match &self.participants[..] {
            [
                Participant { id: a, pending_move: Some(ma), .. },
                Participant { id: b, pending_move: Some(mb), .. },
            ] => ((*a, *ma), (*b, *mb)),
            _ => return Ok(Vec::new()),
        };

        let outcome = resolve_round(first, second);
        for p in &mut self.participants {
            p.pending_move = None;
        }
        let moves = vec![
            MoveEntry { participant_id: first.0, thrown: first.1 },
            MoveEntry { participant_id: second.0, thrown: second.1 },
        ];
        let msgs = self.controller.settle(&mut self.participants, moves, outcome);

        for msg in &msgs {
            match msg {
                ServerMessage::MatchEnd { winner_id, .. } => {
                    tracing::info!(room_id = %self.id, %winner_id, "match finished");
                }
                _ => tracing::info!(
                    room_id = %self.id,
                    winner = ?outcome.winner(),
                    "round resolved"
                ),
            }
        }

        Ok(msgs.into_iter().map(|m| (Recipient::All, m)).collect())
    }

    /// Votes for a rematch. Everyone hears about the vote; once every
    /// seated participant has voted, everyone gets `RematchStart` and the
    /// votes are cleared. Voting twice changes nothing and emits nothing.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] if `participant` holds no seat here.
    /// - [`RoomError::RoundInProgress`] if any move is pending.
    pub fn request_rematch(
        &mut self,
        participant: ParticipantId,
    ) -> Result<Outbound, RoomError> {
        let name = self.name_of(participant)?;
        let roster = self.roster();
        let in_progress = self.round_in_progress();
        let outcome = self.rematch.vote(participant, &roster, in_progress)?;

        let requested = (
            Recipient::All,
            ServerMessage::RematchRequested {
                requester_id: participant,
                name,
            },
        );
        Ok(match outcome {
            VoteOutcome::Duplicate => Vec::new(),
            VoteOutcome::Recorded => {
                tracing::info!(room_id = %self.id, %participant, "rematch requested");
                vec![requested]
            }
            VoteOutcome::Agreed => {
                tracing::info!(room_id = %self.id, "rematch starting");
                vec![requested, (Recipient::All, ServerMessage::RematchStart)]
            }
        })
    }

    /// Withdraws the pending rematch. Emits `RematchCancelled` only if a
    /// vote was actually pending.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `participant` holds no seat here.
    pub fn cancel_rematch(
        &mut self,
        participant: ParticipantId,
    ) -> Result<Outbound, RoomError> {
        let name = self.name_of(participant)?;
        if !self.rematch.withdraw() {
            return Ok(Vec::new());
        }
        tracing::info!(room_id = %self.id, %participant, "rematch cancelled");
        Ok(vec![(
            Recipient::All,
            ServerMessage::RematchCancelled {
                requester_id: participant,
                name,
            },
        )])
    }

    /// Cancels the rematch on behalf of a vote that timed out, but only if
    /// that participant's vote is still outstanding. A vote that already
    /// turned into a rematch, or was withdrawn, is left alone.
    pub fn expire_rematch_vote(
        &mut self,
        participant: ParticipantId,
    ) -> Result<Outbound, RoomError> {
        if !self.rematch.has_voted(participant) {
            return Ok(Vec::new());
        }
        tracing::debug!(room_id = %self.id, %participant, "rematch vote expired");
        self.cancel_rematch(participant)
    }

    /// Relays a chat line to the whole room, sender included.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `participant` holds no seat here.
    pub fn chat(
        &self,
        participant: ParticipantId,
        text: impl Into<String>,
    ) -> Result<Outbound, RoomError> {
        let sender = self.name_of(participant)?;
        Ok(vec![(
            Recipient::All,
            ServerMessage::Chat {
                sender,
                text: text.into(),
                kind: ChatKind::User,
            },
        )])
    }

    /// Snapshot of the room for a `room-status` reply.
    pub fn status(&self) -> ServerMessage {
        ServerMessage::RoomStatus {
            room_id: self.id.clone(),
            state: self.state(),
            participants: self.participants.iter().map(Participant::info).collect(),
            scores: self.scores(),
            rematch_votes: self.rematch.votes().to_vec(),
        }
    }

    fn name_of(&self, participant: ParticipantId) -> Result<String, RoomError> {
        self.participant(participant)
            .map(|p| p.name.clone())
            .ok_or(RoomError::NotInRoom(participant))
    }

    /// Voids every pending move and rematch vote.
    fn reset_round(&mut self) {
        for p in &mut self.participants {
            p.pending_move = None;
        }
        self.rematch.withdraw();
    }
}
