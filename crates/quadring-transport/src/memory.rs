//! In-process transport over tokio channels.
//!
//! [`MemoryConnection::pair`] gives two connected ends. [`MemoryTransport`]
//! plays the listener role: every [`MemoryConnector::connect`] call creates
//! a pair, keeps one end, and queues the other for `accept`.

use std::net::SocketAddr;

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// One end of an in-memory, frame-preserving duplex channel.
pub struct MemoryConnection {
    id: ConnectionId,
    /// `None` once this end has been closed.
    tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryConnection {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: ConnectionId::next(),
            tx: Mutex::new(Some(a_tx)),
            rx: Mutex::new(a_rx),
        };
        let b = Self {
            id: ConnectionId::next(),
            tx: Mutex::new(Some(b_tx)),
            rx: Mutex::new(b_rx),
        };
        (a, b)
    }
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.lock().await;
        let tx = tx
            .as_ref()
            .ok_or_else(|| TransportError::ConnectionClosed("closed locally".into()))?;
        tx.send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.tx.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// A listener that accepts [`MemoryConnection`]s.
pub struct MemoryTransport {
    incoming: mpsc::UnboundedReceiver<MemoryConnection>,
}

/// The dialing side of a [`MemoryTransport`]. Cheap to clone.
#[derive(Clone)]
pub struct MemoryConnector {
    outgoing: mpsc::UnboundedSender<MemoryConnection>,
}

impl MemoryTransport {
    pub fn new() -> (Self, MemoryConnector) {
        let (outgoing, incoming) = mpsc::unbounded_channel();
        (Self { incoming }, MemoryConnector { outgoing })
    }
}

impl MemoryConnector {
    /// Opens a connection to the transport.
    ///
    /// # Errors
    /// Returns [`TransportError::Shutdown`] if the transport was dropped.
    pub fn connect(&self) -> Result<MemoryConnection, TransportError> {
        let (client, server) = MemoryConnection::pair();
        self.outgoing
            .send(server)
            .map_err(|_| TransportError::Shutdown)?;
        Ok(client)
    }
}

impl Transport for MemoryTransport {
    type Connection = MemoryConnection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        self.incoming.recv().await.ok_or(TransportError::Shutdown)
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_frames_both_ways() {
        let (a, b) = MemoryConnection::pair();
        a.send(b"ping").await.unwrap();
        b.send(b"pong").await.unwrap();
        assert_eq!(b.recv().await.unwrap().unwrap(), b"ping");
        assert_eq!(a.recv().await.unwrap().unwrap(), b"pong");
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream() {
        let (a, b) = MemoryConnection::pair();
        a.send(b"last").await.unwrap();
        a.close().await.unwrap();

        assert_eq!(b.recv().await.unwrap().unwrap(), b"last");
        assert!(b.recv().await.unwrap().is_none());
        assert!(matches!(
            a.send(b"more").await,
            Err(TransportError::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_send_to_dropped_peer_fails() {
        let (a, b) = MemoryConnection::pair();
        drop(b);
        assert!(a.send(b"anyone?").await.is_err());
    }

    #[tokio::test]
    async fn test_transport_accepts_connected_clients() {
        let (mut transport, connector) = MemoryTransport::new();
        let client = connector.connect().unwrap();
        let server = transport.accept().await.unwrap();

        client.send(b"hello").await.unwrap();
        assert_eq!(server.recv().await.unwrap().unwrap(), b"hello");
        assert!(transport.local_addr().is_none());

        drop(transport);
        assert!(matches!(connector.connect(), Err(TransportError::Shutdown)));
    }
}
