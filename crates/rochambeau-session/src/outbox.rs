//! Outbound delivery: how the coordinator reaches connected participants.
//!
//! The coordinator never touches sockets. It hands every message to an
//! [`Outbox`], which only has to know how to reach one participant. The
//! server uses [`ChannelOutbox`], which forwards into the per-connection
//! channel drained by that connection's writer task.

use std::collections::HashMap;

use rochambeau_protocol::{ParticipantId, RoomId, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender for delivering messages to one participant's connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Where the coordinator sends messages.
///
/// Delivery is best effort: a participant whose connection is already gone
/// simply misses the message.
pub trait Outbox {
    /// Delivers one message to one participant.
    fn send(&mut self, to: ParticipantId, msg: ServerMessage);

    /// Delivers one message to every member of a room.
    ///
    /// `members` is the roster at the time of the call. The default sends
    /// one copy per member in roster order.
    fn broadcast(
        &mut self,
        room_id: &RoomId,
        members: &[ParticipantId],
        msg: ServerMessage,
    ) {
        tracing::trace!(%room_id, kind = msg.kind(), "broadcast");
        for &member in members {
            self.send(member, msg.clone());
        }
    }
}

/// An [`Outbox`] backed by one unbounded channel per participant.
#[derive(Debug, Default)]
pub struct ChannelOutbox {
    senders: HashMap<ParticipantId, OutboundSender>,
}

impl ChannelOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts delivering to `participant` through `sender`. Replaces any
    /// previous sender for the same participant.
    pub fn register(&mut self, participant: ParticipantId, sender: OutboundSender) {
        self.senders.insert(participant, sender);
    }

    /// Stops delivering to `participant`.
    pub fn unregister(&mut self, participant: ParticipantId) {
        self.senders.remove(&participant);
    }

    pub fn is_registered(&self, participant: ParticipantId) -> bool {
        self.senders.contains_key(&participant)
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl Outbox for ChannelOutbox {
    fn send(&mut self, to: ParticipantId, msg: ServerMessage) {
        match self.senders.get(&to) {
            Some(sender) => {
                if sender.send(msg).is_err() {
                    tracing::debug!(participant = %to, "outbound channel closed, dropping message");
                }
            }
            None => {
                tracing::debug!(participant = %to, kind = msg.kind(), "no outbound channel, dropping message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_reaches_registered_participant() {
        let mut outbox = ChannelOutbox::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        outbox.register(ParticipantId(1), tx);

        outbox.send(ParticipantId(1), ServerMessage::RematchStart);

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::RematchStart);
    }

    #[test]
    fn test_send_to_unknown_participant_is_dropped() {
        let mut outbox = ChannelOutbox::new();
        outbox.send(ParticipantId(7), ServerMessage::RematchStart);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let mut outbox = ChannelOutbox::new();
        let (tx, rx) = mpsc::unbounded_channel();
        outbox.register(ParticipantId(1), tx);
        drop(rx);

        outbox.send(ParticipantId(1), ServerMessage::RematchStart);
    }

    #[test]
    fn test_broadcast_sends_one_copy_per_member() {
        let mut outbox = ChannelOutbox::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        outbox.register(ParticipantId(1), tx1);
        outbox.register(ParticipantId(2), tx2);

        let room = RoomId::parse("R1").unwrap();
        outbox.broadcast(&room, &[ParticipantId(1), ParticipantId(2)], ServerMessage::RematchStart);

        assert_eq!(rx1.try_recv().unwrap(), ServerMessage::RematchStart);
        assert_eq!(rx2.try_recv().unwrap(), ServerMessage::RematchStart);
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let mut outbox = ChannelOutbox::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        outbox.register(ParticipantId(1), tx);
        outbox.unregister(ParticipantId(1));

        outbox.send(ParticipantId(1), ServerMessage::RematchStart);

        assert!(!outbox.is_registered(ParticipantId(1)));
        assert!(rx.try_recv().is_err());
    }
}
