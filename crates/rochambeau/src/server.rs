//! `RochambeauServer` builder and server loop.
//!
//! This is the entry point for running a Rochambeau server. It ties
//! together all the layers: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rochambeau_protocol::{Codec, JsonCodec};
use rochambeau_room::MatchConfig;
use rochambeau_session::{CoordinatorHandle, spawn_coordinator};
use rochambeau_transport::{Transport, WebSocketTransport};

use crate::RochambeauError;
use crate::handler::handle_connection;

/// How long a freshly accepted socket gets to finish the WebSocket upgrade.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) codec: C,
    pub(crate) match_config: MatchConfig,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for configuring and starting a Rochambeau server.
///
/// # Example
///
/// ```rust,no_run
/// use rochambeau::prelude::*;
///
/// # async fn run() -> Result<(), RochambeauError> {
/// let server = RochambeauServer::builder()
///     .bind("0.0.0.0:3001")
///     .match_config(MatchConfig::first_to(3))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RochambeauServerBuilder {
    bind_addr: String,
    match_config: MatchConfig,
    handshake_timeout: Duration,
}

impl RochambeauServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            match_config: MatchConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the win threshold and rematch vote timeout.
    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// Sets how long a new socket may take to complete the WebSocket
    /// upgrade before it is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and starts the session coordinator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<RochambeauServer<JsonCodec>, RochambeauError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let match_config = self.match_config.validated();

        let state = Arc::new(ServerState {
            coordinator: spawn_coordinator(match_config.clone()),
            codec: JsonCodec,
            match_config,
            handshake_timeout: self.handshake_timeout,
        });

        Ok(RochambeauServer { transport, state })
    }
}

impl Default for RochambeauServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Rochambeau server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RochambeauServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl RochambeauServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> RochambeauServerBuilder {
        RochambeauServerBuilder::new()
    }
}

impl<C> RochambeauServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the session coordinator, for inspecting live state.
    pub fn coordinator(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    pub fn match_config(&self) -> &MatchConfig {
        &self.state.match_config
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted socket; the WebSocket
    /// upgrade happens inside that task. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), RochambeauError> {
        tracing::info!(
            addr = ?self.local_addr().ok(),
            win_threshold = self.state.match_config.win_threshold,
            "Rochambeau server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
