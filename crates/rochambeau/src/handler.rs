//! Per-connection handler: identity, outbound writer, and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Complete the WebSocket handshake, bounded by the handshake timeout
//!   2. Derive the participant id from the connection id
//!   3. Spawn a writer task that drains the participant's outbound channel
//!   4. Register with the coordinator → client receives `connected`
//!   5. Loop: receive frames → validate → forward to the coordinator

use std::sync::Arc;

use rochambeau_protocol::{
    ClientMessage, Codec, ParticipantId, ProtocolError, ServerMessage,
    decode_client_message,
};
use rochambeau_session::{CoordinatorHandle, OutboundSender};
use rochambeau_transport::{
    Connection, Pending, PendingWebSocket, TransportError, WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::RochambeauError;
use crate::server::ServerState;
use crate::timer::RematchTimer;

/// Drop guard that tells the coordinator a participant is gone when the
/// handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async send.
struct DisconnectGuard {
    participant: ParticipantId,
    coordinator: CoordinatorHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let participant = self.participant;
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            let _ = coordinator.disconnect(participant).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    pending: PendingWebSocket,
    state: Arc<ServerState<C>>,
) -> Result<(), RochambeauError>
where
    C: Codec + Clone,
{
    let conn_id = pending.id();
    let peer = pending.peer_addr();
    let conn = match tokio::time::timeout(state.handshake_timeout, pending.handshake()).await {
        Ok(result) => Arc::new(result?),
        Err(_) => {
            tracing::debug!(%conn_id, %peer, "handshake timed out");
            return Err(TransportError::HandshakeFailed(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "handshake timed out",
            ))
            .into());
        }
    };
    let participant = ParticipantId(conn_id.into_inner());
    tracing::debug!(%conn_id, %participant, "handling new connection");

    let (outbound, inbox) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(Arc::clone(&conn), inbox, state.codec.clone(), participant));

    state.coordinator.connect(participant, outbound.clone()).await?;
    let _guard = DisconnectGuard {
        participant,
        coordinator: state.coordinator.clone(),
    };
    let mut rematch_timer = RematchTimer::new(
        participant,
        state.match_config.rematch_vote_timeout,
        state.coordinator.clone(),
    );

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%participant, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%participant, error = %e, "recv error");
                break;
            }
        };

        let Some(msg) = validate(&state.codec, &data, participant, &outbound) else {
            continue;
        };

        match &msg {
            ClientMessage::RematchRequest => rematch_timer.arm(),
            ClientMessage::RematchCancel | ClientMessage::Leave => rematch_timer.disarm(),
            _ => {}
        }

        state.coordinator.send(participant, msg).await?;
    }

    // _guard drops here → coordinator disconnect fires.
    Ok(())
}

/// Decodes one inbound frame. Invalid frames never reach the coordinator:
/// a bad move is dropped quietly, anything else malformed is answered with
/// `error` 400.
fn validate<C: Codec>(
    codec: &C,
    data: &[u8],
    participant: ParticipantId,
    outbound: &OutboundSender,
) -> Option<ClientMessage> {
    match decode_client_message(codec, data) {
        Ok(msg) => Some(msg),
        Err(ProtocolError::InvalidMove(raw)) => {
            tracing::debug!(%participant, %raw, "invalid move dropped");
            None
        }
        Err(e) => {
            tracing::warn!(%participant, error = %e, "malformed client message");
            let _ = outbound.send(ServerMessage::error(400, e.to_string()));
            None
        }
    }
}

/// Encodes everything queued for this participant and writes it to the
/// socket, in order. Ends when the channel closes or a write fails.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut inbox: mpsc::UnboundedReceiver<ServerMessage>,
    codec: C,
    participant: ParticipantId,
) {
    while let Some(msg) = inbox.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%participant, kind = msg.kind(), error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%participant, error = %e, "write failed, stopping writer");
            break;
        }
    }
    tracing::trace!(%participant, "writer stopped");
}
