//! Coordinator actor: the [`SessionCoordinator`] running in its own Tokio
//! task.
//!
//! Connection handlers never touch the coordinator directly. They send
//! commands through a [`CoordinatorHandle`], and the actor applies them one
//! at a time, so two participants' moves can never interleave. Most
//! commands are fire-and-forget; queries carry a `oneshot` reply channel.

use rochambeau_protocol::{ClientMessage, PROTOCOL_VERSION, ParticipantId, ServerMessage};
use rochambeau_room::MatchConfig;
use tokio::sync::{mpsc, oneshot};

use crate::{Binding, ChannelOutbox, OutboundSender, Outbox, SessionCoordinator, SessionError};

/// Default command channel size.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Commands sent to the coordinator actor through its channel.
pub(crate) enum Command {
    /// A connection was accepted; start delivering to `sender`.
    Connect {
        participant: ParticipantId,
        sender: OutboundSender,
    },

    /// A validated message from a participant.
    Client {
        participant: ParticipantId,
        msg: ClientMessage,
    },

    /// A participant's rematch vote timer fired.
    ExpireRematchVote { participant: ParticipantId },

    /// A connection closed.
    Disconnect { participant: ParticipantId },

    RoomCount { reply: oneshot::Sender<usize> },

    Binding {
        participant: ParticipantId,
        reply: oneshot::Sender<Option<Binding>>,
    },

    /// Stop the actor.
    Shutdown,
}

/// Handle to the running coordinator actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. Every connection
/// handler holds one.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Registers a participant's outbound channel. The participant
    /// immediately receives `connected`.
    pub async fn connect(
        &self,
        participant: ParticipantId,
        sender: OutboundSender,
    ) -> Result<(), SessionError> {
        self.command(Command::Connect {
            participant,
            sender,
        })
        .await
    }

    /// Forwards a validated client message (fire-and-forget).
    pub async fn send(
        &self,
        participant: ParticipantId,
        msg: ClientMessage,
    ) -> Result<(), SessionError> {
        self.command(Command::Client { participant, msg }).await
    }

    pub async fn expire_rematch_vote(&self, participant: ParticipantId) -> Result<(), SessionError> {
        self.command(Command::ExpireRematchVote { participant }).await
    }

    /// Leaves the participant's room as a disconnect and stops delivering
    /// to them.
    pub async fn disconnect(&self, participant: ParticipantId) -> Result<(), SessionError> {
        self.command(Command::Disconnect { participant }).await
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> Result<usize, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::RoomCount { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// The room a participant is bound to, if any.
    pub async fn binding(&self, participant: ParticipantId) -> Result<Option<Binding>, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::Binding {
            participant,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.command(Command::Shutdown).await
    }

    async fn command(&self, cmd: Command) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

/// The actor state. Runs inside a Tokio task.
struct CoordinatorActor {
    coordinator: SessionCoordinator<ChannelOutbox>,
    receiver: mpsc::Receiver<Command>,
}

impl CoordinatorActor {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("session coordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Connect {
                    participant,
                    sender,
                } => {
                    let outbox = self.coordinator.outbox_mut();
                    outbox.register(participant, sender);
                    outbox.send(
                        participant,
                        ServerMessage::Connected {
                            participant_id: participant,
                            protocol_version: PROTOCOL_VERSION,
                        },
                    );
                    tracing::debug!(%participant, "participant connected");
                }
                Command::Client { participant, msg } => {
                    self.coordinator.handle(participant, msg);
                }
                Command::ExpireRematchVote { participant } => {
                    self.coordinator.expire_rematch_vote(participant);
                }
                Command::Disconnect { participant } => {
                    self.coordinator.disconnect(participant);
                    self.coordinator.outbox_mut().unregister(participant);
                    tracing::debug!(%participant, "participant disconnected");
                }
                Command::RoomCount { reply } => {
                    let _ = reply.send(self.coordinator.room_count());
                }
                Command::Binding { participant, reply } => {
                    let _ = reply.send(self.coordinator.binding(participant).cloned());
                }
                Command::Shutdown => {
                    tracing::info!("session coordinator shutting down");
                    break;
                }
            }
        }

        tracing::info!("session coordinator stopped");
    }
}

/// Spawns the coordinator actor and returns a handle to it.
pub fn spawn_coordinator(config: MatchConfig) -> CoordinatorHandle {
    spawn_coordinator_with_capacity(config, DEFAULT_CHANNEL_SIZE)
}

/// Like [`spawn_coordinator`], with an explicit command channel size.
/// When the channel is full, senders wait.
pub fn spawn_coordinator_with_capacity(config: MatchConfig, channel_size: usize) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = CoordinatorActor {
        coordinator: SessionCoordinator::new(config, ChannelOutbox::new()),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    CoordinatorHandle { sender: tx }
}
