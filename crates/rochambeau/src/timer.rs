//! Per-connection rematch vote timer.
//!
//! Rooms never keep time. When a participant votes for a rematch, their
//! connection handler arms this timer; if it fires before the vote turns
//! into a rematch, the coordinator is asked to expire that vote. The
//! coordinator checks the vote is still outstanding, so a timer that fires
//! after the rematch already started does nothing.

use std::time::Duration;

use rochambeau_protocol::ParticipantId;
use rochambeau_session::CoordinatorHandle;
use tokio::task::JoinHandle;

pub(crate) struct RematchTimer {
    participant: ParticipantId,
    timeout: Duration,
    coordinator: CoordinatorHandle,
    pending: Option<JoinHandle<()>>,
}

impl RematchTimer {
    pub(crate) fn new(
        participant: ParticipantId,
        timeout: Duration,
        coordinator: CoordinatorHandle,
    ) -> Self {
        Self {
            participant,
            timeout,
            coordinator,
            pending: None,
        }
    }

    /// Starts the countdown, restarting it if one is already running.
    pub(crate) fn arm(&mut self) {
        self.disarm();

        let participant = self.participant;
        let timeout = self.timeout;
        let coordinator = self.coordinator.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::debug!(%participant, "rematch vote timed out");
            if let Err(e) = coordinator.expire_rematch_vote(participant).await {
                tracing::debug!(%participant, error = %e, "could not expire rematch vote");
            }
        }));
    }

    /// Stops the countdown, if any.
    pub(crate) fn disarm(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RematchTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use rochambeau_protocol::{ClientMessage, RoomId, ServerMessage};
    use rochambeau_room::MatchConfig;
    use rochambeau_session::spawn_coordinator;
    use tokio::sync::mpsc;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(15);

    /// Seats Alice and Bob in one room, with Alice's rematch vote pending.
    /// Returns Bob's inbox, drained up to the vote.
    async fn vote_pending(
        coordinator: &CoordinatorHandle,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (alice_tx, _alice_rx) = mpsc::unbounded_channel();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
        coordinator.connect(ParticipantId(1), alice_tx).await.unwrap();
        coordinator.connect(ParticipantId(2), bob_tx).await.unwrap();

        for (id, name) in [(1, "Alice"), (2, "Bob")] {
            let join = ClientMessage::Join {
                room_id: Some(RoomId::parse("R1").unwrap()),
                name: name.into(),
            };
            coordinator.send(ParticipantId(id), join).await.unwrap();
        }
        coordinator
            .send(ParticipantId(1), ClientMessage::RematchRequest)
            .await
            .unwrap();

        loop {
            match bob_rx.recv().await {
                Some(ServerMessage::RematchRequested { .. }) => return bob_rx,
                Some(_) => continue,
                None => panic!("bob's inbox closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expiry_cancels_pending_vote() {
        let coordinator = spawn_coordinator(MatchConfig::default());
        let mut bob = vote_pending(&coordinator).await;

        let mut timer = RematchTimer::new(ParticipantId(1), TIMEOUT, coordinator.clone());
        timer.arm();
        tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;

        match bob.recv().await {
            Some(ServerMessage::RematchCancelled { requester_id, .. }) => {
                assert_eq!(requester_id, ParticipantId(1));
            }
            other => panic!("expected rematch-cancelled, got {other:?}"),
        }
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_timer_never_fires() {
        let coordinator = spawn_coordinator(MatchConfig::default());
        let mut bob = vote_pending(&coordinator).await;

        let mut timer = RematchTimer::new(ParticipantId(1), TIMEOUT, coordinator.clone());
        timer.arm();
        timer.disarm();
        tokio::time::sleep(TIMEOUT * 2).await;

        coordinator.room_count().await.unwrap();
        assert!(bob.try_recv().is_err(), "no cancellation expected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_restarts_countdown() {
        let coordinator = spawn_coordinator(MatchConfig::default());
        let mut bob = vote_pending(&coordinator).await;

        let mut timer = RematchTimer::new(ParticipantId(1), TIMEOUT, coordinator.clone());
        timer.arm();
        tokio::time::sleep(Duration::from_secs(10)).await;
        timer.arm();
        tokio::time::sleep(Duration::from_secs(10)).await;

        coordinator.room_count().await.unwrap();
        assert!(bob.try_recv().is_err(), "countdown should have restarted");
        assert!(timer.is_armed());
    }
}
