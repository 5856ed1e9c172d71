//! `RelayServer` builder and accept loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use quadring_protocol::{Codec, JsonCodec, PlayerId};
use quadring_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{Lobby, RelayConfig, RelayError};

/// Shared relay state passed to each connection task.
pub(crate) struct RelayState<C: Codec> {
    pub(crate) lobby: Mutex<Lobby>,
    pub(crate) config: RelayConfig,
    pub(crate) codec: C,
    next_player_id: AtomicU64,
}

impl<C: Codec> RelayState<C> {
    fn new(config: RelayConfig, codec: C) -> Self {
        Self {
            lobby: Mutex::new(Lobby::new()),
            config,
            codec,
            next_player_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn assign_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for a WebSocket relay.
///
/// # Example
///
/// ```rust,no_run
/// use quadring_relay::{RelayConfig, RelayServer};
///
/// # async fn run() -> Result<(), quadring_relay::RelayError> {
/// let server = RelayServer::builder()
///     .config(RelayConfig::default())
///     .bind("0.0.0.0:9000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelayServerBuilder {
    config: RelayConfig,
}

impl RelayServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Binds the WebSocket listener.
    pub async fn build(self) -> Result<RelayServer<WebSocketTransport>, RelayError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        Ok(RelayServer::with_transport(transport, self.config))
    }
}

/// A relay bound to a transport. Call [`run()`](Self::run) to serve.
pub struct RelayServer<T: Transport, C: Codec = JsonCodec> {
    transport: T,
    state: Arc<RelayState<C>>,
}

impl RelayServer<WebSocketTransport> {
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }
}

impl<T: Transport> RelayServer<T> {
    /// Serves an already-constructed transport with the JSON codec, for
    /// example a [`MemoryTransport`](quadring_transport::MemoryTransport).
    pub fn with_transport(transport: T, config: RelayConfig) -> Self {
        Self::with_codec(transport, config, JsonCodec)
    }
}

impl<T: Transport, C: Codec> RelayServer<T, C> {
    pub fn with_codec(transport: T, config: RelayConfig, codec: C) -> Self {
        Self {
            transport,
            state: Arc::new(RelayState::new(config, codec)),
        }
    }

    /// The address the transport listens on, if it has one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the transport shuts down.
    ///
    /// Each connection gets its own task; a failing connection is logged
    /// and never stops the loop.
    pub async fn run(mut self) -> Result<(), RelayError> {
        tracing::info!(addr = ?self.local_addr(), "relay running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(TransportError::Shutdown) => {
                    tracing::info!("transport shut down, relay stopping");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
