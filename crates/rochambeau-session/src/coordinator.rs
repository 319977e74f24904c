//! The session coordinator: the single entry point for participant events.
//!
//! It binds each participant to at most one room, forwards every request to
//! that room, and delivers whatever the room produced through its
//! [`Outbox`]. Each operation touches exactly one room and runs to
//! completion before the next one starts.
//!
//! # Concurrency note
//!
//! `SessionCoordinator` is a plain `&mut self` state machine. The server
//! owns it inside one task (see [`spawn_coordinator`](crate::spawn_coordinator))
//! and feeds it through a channel, which is what serializes room mutations.
//!
//! ```text
//! join ──→ [bound to room] ──→ leave / disconnect ──→ [unbound]
//!              │    ↑
//!              ▼    │
//!     move / rematch / chat / status
//! ```

use std::collections::HashMap;

use rochambeau_protocol::{
    ClientMessage, Move, ParticipantId, Recipient, RoomId, ServerMessage,
};
use rochambeau_room::{
    LeaveReason, MatchConfig, Outbound, Room, RoomError, RoomRegistry,
};

use crate::Outbox;

/// Where a participant currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_id: RoomId,
    pub name: String,
}

/// Owns the room registry and every participant's room binding.
pub struct SessionCoordinator<O: Outbox> {
    registry: RoomRegistry,
    bindings: HashMap<ParticipantId, Binding>,
    outbox: O,
}

impl<O: Outbox> SessionCoordinator<O> {
    /// Creates a coordinator with an empty registry.
    pub fn new(config: MatchConfig, outbox: O) -> Self {
        Self {
            registry: RoomRegistry::new(config),
            bindings: HashMap::new(),
            outbox,
        }
    }

    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// The room a participant is bound to, if any.
    pub fn binding(&self, participant: ParticipantId) -> Option<&Binding> {
        self.bindings.get(&participant)
    }

    // -- Dispatch ---------------------------------------------------------

    /// Routes one validated client message and answers failures.
    ///
    /// Rejections go back to the offending participant only, mapped by
    /// [`error_reply`]; some are dropped without a reply.
    pub fn handle(&mut self, participant: ParticipantId, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::Join { room_id, name } => {
                self.join(participant, room_id, name).map(|_| ())
            }
            ClientMessage::Move { thrown } => self.submit_move(participant, thrown),
            ClientMessage::RematchRequest => self.request_rematch(participant),
            ClientMessage::RematchCancel => self.cancel_rematch(participant),
            ClientMessage::Leave => self.leave(participant),
            ClientMessage::Chat { text } => self.relay_chat(participant, text),
            ClientMessage::RoomStatus => self
                .room_status(participant)
                .map(|status| self.outbox.send(participant, status)),
        };

        if let Err(err) = result {
            self.reject(participant, &err);
        }
    }

    fn reject(&mut self, participant: ParticipantId, err: &RoomError) {
        match error_reply(err) {
            Some(reply) => {
                tracing::debug!(%participant, error = %err, "request rejected");
                self.outbox.send(participant, reply);
            }
            None => {
                tracing::debug!(%participant, error = %err, "request dropped");
            }
        }
    }

    // -- Operations -------------------------------------------------------

    /// Seats a participant in a room, creating it if needed.
    ///
    /// With `room_id` of `None` a fresh code is generated. Returns the code
    /// of the room joined.
    ///
    /// # Errors
    /// - [`RoomError::InvalidRoomId`] if the code is blank.
    /// - [`RoomError::AlreadyInRoom`] if bound to a different room.
    /// - [`RoomError::RoomFull`] if the room holds two others.
    pub fn join(
        &mut self,
        participant: ParticipantId,
        room_id: Option<RoomId>,
        name: String,
    ) -> Result<RoomId, RoomError> {
        if room_id.as_ref().is_some_and(RoomId::is_blank) {
            return Err(RoomError::InvalidRoomId);
        }
        if let Some(current) = self.bindings.get(&participant) {
            if room_id.as_ref() != Some(&current.room_id) {
                return Err(RoomError::AlreadyInRoom(
                    participant,
                    current.room_id.clone(),
                ));
            }
        }

        let room_id = match room_id {
            Some(id) => id,
            None => self.registry.generate_room_id(),
        };

        let joined = self
            .registry
            .get_or_create(&room_id)
            .join(participant, name.clone());
        let out = match joined {
            Ok(out) => out,
            Err(err) => {
                self.registry.remove_if_empty(&room_id);
                return Err(err);
            }
        };

        self.bindings.insert(
            participant,
            Binding {
                room_id: room_id.clone(),
                name,
            },
        );
        self.deliver(&room_id, out);
        Ok(room_id)
    }

    /// Throws a move in the participant's room.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] if unbound.
    /// - [`RoomError::MoveAlreadySubmitted`] if they already threw.
    pub fn submit_move(
        &mut self,
        participant: ParticipantId,
        thrown: Move,
    ) -> Result<(), RoomError> {
        self.with_room(participant, |room| room.submit_move(participant, thrown))
    }

    /// # Errors
    /// - [`RoomError::NotInRoom`] if unbound.
    /// - [`RoomError::RoundInProgress`] if a move is pending.
    pub fn request_rematch(&mut self, participant: ParticipantId) -> Result<(), RoomError> {
        self.with_room(participant, |room| room.request_rematch(participant))
    }

    /// # Errors
    /// [`RoomError::NotInRoom`] if unbound.
    pub fn cancel_rematch(&mut self, participant: ParticipantId) -> Result<(), RoomError> {
        self.with_room(participant, |room| room.cancel_rematch(participant))
    }

    /// Called when a participant's rematch vote timer fires. Cancels the
    /// rematch only if that vote is still outstanding; a no-op for a
    /// participant who has since left.
    pub fn expire_rematch_vote(&mut self, participant: ParticipantId) {
        if !self.bindings.contains_key(&participant) {
            return;
        }
        if let Err(err) =
            self.with_room(participant, |room| room.expire_rematch_vote(participant))
        {
            tracing::debug!(%participant, error = %err, "rematch vote expiry ignored");
        }
    }

    /// Relays a chat line to the participant's room.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if unbound.
    pub fn relay_chat(
        &mut self,
        participant: ParticipantId,
        text: String,
    ) -> Result<(), RoomError> {
        self.with_room(participant, |room| room.chat(participant, text))
    }

    /// A snapshot of the participant's room.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if unbound.
    pub fn room_status(&self, participant: ParticipantId) -> Result<ServerMessage, RoomError> {
        let binding = self
            .bindings
            .get(&participant)
            .ok_or(RoomError::NotInRoom(participant))?;
        self.registry
            .get(&binding.room_id)
            .map(|room| room.status())
            .ok_or_else(|| RoomError::NotFound(binding.room_id.clone()))
    }

    /// Leaves the current room on request.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if unbound.
    pub fn leave(&mut self, participant: ParticipantId) -> Result<(), RoomError> {
        self.unbind(participant, LeaveReason::Left)
    }

    /// Leaves the current room because the connection dropped. Safe to
    /// call more than once, and for participants who never joined.
    pub fn disconnect(&mut self, participant: ParticipantId) {
        match self.unbind(participant, LeaveReason::Disconnected) {
            Ok(()) | Err(RoomError::NotInRoom(_)) => {}
            Err(err) => {
                tracing::warn!(%participant, error = %err, "disconnect cleanup failed");
            }
        }
    }

    // -- Internals --------------------------------------------------------

    fn unbind(&mut self, participant: ParticipantId, reason: LeaveReason) -> Result<(), RoomError> {
        let binding = self
            .bindings
            .remove(&participant)
            .ok_or(RoomError::NotInRoom(participant))?;
        let room_id = binding.room_id;

        let Some(room) = self.registry.get_mut(&room_id) else {
            tracing::warn!(%participant, %room_id, "bound to a room that no longer exists");
            return Ok(());
        };
        let result = room
            .leave(participant, reason)
            .map(|out| self.deliver(&room_id, out));
        self.registry.remove_if_empty(&room_id);
        result
    }

    /// Runs `op` against the participant's room and delivers its output.
    /// Empty rooms are dropped afterwards whatever the outcome.
    fn with_room<F>(&mut self, participant: ParticipantId, op: F) -> Result<(), RoomError>
    where
        F: FnOnce(&mut Room) -> Result<Outbound, RoomError>,
    {
        let room_id = self
            .bindings
            .get(&participant)
            .map(|b| b.room_id.clone())
            .ok_or(RoomError::NotInRoom(participant))?;
        let room = self
            .registry
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let result = op(room).map(|out| self.deliver(&room_id, out));
        self.registry.remove_if_empty(&room_id);
        result
    }

    /// Resolves each recipient against the room's roster as it is now.
    fn deliver(&mut self, room_id: &RoomId, out: Outbound) {
        let roster = self
            .registry
            .get(room_id)
            .map(|room| room.roster())
            .unwrap_or_default();

        for (recipient, msg) in out {
            match recipient {
                Recipient::All => self.outbox.broadcast(room_id, &roster, msg),
                Recipient::Participant(to) => self.outbox.send(to, msg),
            }
        }
    }
}

/// Maps a rejected operation onto the reply the offender gets, or `None`
/// when the request is silently dropped.
///
/// | error | reply |
/// |---|---|
/// | `RoomFull` | `room-full` |
/// | `MoveAlreadySubmitted` | none |
/// | `RoundInProgress`, `AlreadyInRoom` | `error` 409 |
/// | `NotInRoom`, `NotFound` | `error` 404 |
/// | `InvalidRoomId` | `error` 400 |
pub fn error_reply(err: &RoomError) -> Option<ServerMessage> {
    match err {
        RoomError::RoomFull(_) => Some(ServerMessage::RoomFull),
        RoomError::MoveAlreadySubmitted(_) => None,
        RoomError::RoundInProgress | RoomError::AlreadyInRoom(..) => {
            Some(ServerMessage::error(409, err.to_string()))
        }
        RoomError::NotInRoom(_) | RoomError::NotFound(_) => {
            Some(ServerMessage::error(404, err.to_string()))
        }
        RoomError::InvalidRoomId => Some(ServerMessage::error(400, err.to_string())),
    }
}
