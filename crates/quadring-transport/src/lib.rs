//! Transport abstraction layer for Quadring.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the relay and
//! the game client never name a concrete network stack. Two
//! implementations ship here:
//!
//! - [`WebSocketTransport`] / [`WebSocketConnection`] over `tokio-tungstenite`
//! - [`MemoryTransport`] / [`MemoryConnection`] over tokio channels, for
//!   peers living in the same process (tests, local hot-seat)
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

mod error;
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::{MemoryConnection, MemoryConnector, MemoryTransport};
#[cfg(feature = "websocket")]
pub use websocket::{
    ClientWebSocketConnection, WebSocketConnection, WebSocketTransport, connect,
};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Hands out process-wide unique ids, starting at 1.
    pub(crate) fn next() -> Self {
        static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// The socket address being listened on, if there is one.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// A single connection that can send and receive byte frames.
///
/// All methods take `&self`: a connection is typically shared in an `Arc`
/// between a task that reads and a task that writes. The returned
/// futures are `Send` so generic code can hand them to `tokio::spawn`.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection. The peer's next `recv` yields `Ok(None)`.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn id(&self) -> ConnectionId;
}
