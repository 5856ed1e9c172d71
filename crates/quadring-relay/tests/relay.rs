//! Integration tests for the relay: handshake, pairing, forwarding and
//! withdrawal, over real WebSockets and over the in-memory transport.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use quadring_protocol::{
    Codec, Envelope, JsonCodec, Movement, PROTOCOL_VERSION, PeerMessage, PlayerId, Position,
    RingType, StartStatus,
};
use quadring_relay::{RelayConfig, RelayServer};
use quadring_transport::{Connection, MemoryConnection, MemoryConnector, MemoryTransport};
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(2);

// =========================================================================
// Helpers
// =========================================================================

fn start_memory_relay(config: RelayConfig) -> MemoryConnector {
    let (transport, connector) = MemoryTransport::new();
    let server = RelayServer::with_transport(transport, config);
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    connector
}

/// A minimal client speaking envelopes over any connection.
struct TestClient<C: Connection> {
    conn: C,
    seq: u64,
}

impl<C: Connection> TestClient<C> {
    fn new(conn: C) -> Self {
        Self { conn, seq: 0 }
    }

    async fn send(&mut self, message: PeerMessage) {
        let envelope = Envelope { seq: self.seq, message };
        self.seq += 1;
        let bytes = JsonCodec.encode(&envelope).unwrap();
        self.conn.send(&bytes).await.expect("send");
    }

    async fn recv(&self) -> Option<PeerMessage> {
        let data = tokio::time::timeout(WAIT, self.conn.recv())
            .await
            .expect("relay should answer in time")
            .expect("recv")?;
        let envelope: Envelope = JsonCodec.decode(&data).expect("decode");
        Some(envelope.message)
    }

    async fn expect(&self) -> PeerMessage {
        self.recv().await.expect("connection should be open")
    }

    async fn hello(&mut self, name: &str) -> PlayerId {
        self.send(PeerMessage::Hello {
            version: PROTOCOL_VERSION,
            name: name.into(),
        })
        .await;
        match self.expect().await {
            PeerMessage::Welcome { player_id } => player_id,
            other => panic!("expected Welcome, got {other:?}"),
        }
    }

    async fn started(&self) -> StartStatus {
        match self.expect().await {
            PeerMessage::MatchStarted { start } => start,
            other => panic!("expected MatchStarted, got {other:?}"),
        }
    }
}

/// Connects two clients and pairs them. Returns them with their starts.
async fn paired(
    connector: &MemoryConnector,
) -> (
    TestClient<MemoryConnection>,
    StartStatus,
    TestClient<MemoryConnection>,
    StartStatus,
) {
    let mut a = TestClient::new(connector.connect().unwrap());
    let mut b = TestClient::new(connector.connect().unwrap());
    a.hello("Mamute Generoso").await;
    b.hello("Galinha Generosa").await;

    a.send(PeerMessage::FindMatch).await;
    assert_eq!(a.expect().await, PeerMessage::Waiting);
    b.send(PeerMessage::FindMatch).await;

    let sa = a.started().await;
    let sb = b.started().await;
    (a, sa, b, sb)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_websocket_handshake_and_welcome() {
    let server = RelayServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("relay should bind");
    let addr = server.local_addr().expect("tcp relay has an address");
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");

    let hello = Envelope {
        seq: 0,
        message: PeerMessage::Hello {
            version: PROTOCOL_VERSION,
            name: "Cavalo Veloz".into(),
        },
    };
    ws.send(Message::Binary(serde_json::to_vec(&hello).unwrap().into()))
        .await
        .unwrap();

    let msg = ws.next().await.unwrap().unwrap();
    let envelope: Envelope = serde_json::from_slice(&msg.into_data()).unwrap();
    assert_eq!(envelope.seq, 0);
    assert!(matches!(envelope.message, PeerMessage::Welcome { .. }));

    ws.send(Message::Text(r#"{"seq":1,"message":{"type":"FindMatch"}}"#.into()))
        .await
        .unwrap();
    let msg = ws.next().await.unwrap().unwrap();
    let envelope: Envelope = serde_json::from_slice(&msg.into_data()).unwrap();
    assert_eq!(envelope.seq, 1);
    assert_eq!(envelope.message, PeerMessage::Waiting);
}

#[tokio::test]
async fn test_version_mismatch_is_rejected() {
    let connector = start_memory_relay(RelayConfig::default());
    let mut client = TestClient::new(connector.connect().unwrap());
    client
        .send(PeerMessage::Hello {
            version: PROTOCOL_VERSION + 1,
            name: "Rato Ligeiro".into(),
        })
        .await;

    match client.expect().await {
        PeerMessage::Error { code, message } => {
            assert_eq!(code, 400);
            assert!(message.contains("version mismatch"));
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_message_must_be_hello() {
    let connector = start_memory_relay(RelayConfig::default());
    let mut client = TestClient::new(connector.connect().unwrap());
    client.send(PeerMessage::FindMatch).await;
    assert!(matches!(client.expect().await, PeerMessage::Error { code: 400, .. }));
}

#[tokio::test]
async fn test_silent_connection_times_out_during_handshake() {
    let config = RelayConfig::default().with_handshake_timeout(Duration::from_millis(50));
    let connector = start_memory_relay(config);
    let client = TestClient::new(connector.connect().unwrap());
    // The relay drops its end; nothing is ever sent.
    assert_eq!(client.recv().await, None);
}

#[tokio::test]
async fn test_pairing_gives_each_side_its_own_view() {
    let connector = start_memory_relay(RelayConfig::default());
    let (_a, sa, _b, sb) = paired(&connector).await;

    assert_eq!(sa, sb.flipped());
    assert_eq!(sa.local.name, "Mamute Generoso");
    assert_eq!(sb.local.name, "Galinha Generosa");
    assert_ne!(sa.local_moves_first(), sb.local_moves_first());
    assert_ne!(sa.local.id, sa.remote.id);
}

#[tokio::test]
async fn test_moves_are_forwarded_untouched() {
    let connector = start_memory_relay(RelayConfig::default());
    let (mut a, sa, mut b, _) = paired(&connector).await;
    let (first, second) = if sa.local_moves_first() {
        (&mut a, &mut b)
    } else {
        (&mut b, &mut a)
    };

    let movement = Movement::place_ring(Position::new(2, 3), RingType::Blue);
    first.send(PeerMessage::Move { movement }).await;
    assert_eq!(second.expect().await, PeerMessage::Move { movement });

    let reply = Movement::move_cell_content(Position::new(2, 3), Position::new(0, 1));
    second.send(PeerMessage::Move { movement: reply }).await;
    assert_eq!(first.expect().await, PeerMessage::Move { movement: reply });
}

#[tokio::test]
async fn test_move_without_match_is_conflict() {
    let connector = start_memory_relay(RelayConfig::default());
    let mut client = TestClient::new(connector.connect().unwrap());
    client.hello("Lobo Inteligente").await;

    let movement = Movement::place_ring(Position::new(0, 0), RingType::Red);
    client.send(PeerMessage::Move { movement }).await;
    assert!(matches!(client.expect().await, PeerMessage::Error { code: 409, .. }));
}

#[tokio::test]
async fn test_disconnect_sends_withdrawal_to_opponent() {
    let connector = start_memory_relay(RelayConfig::default());
    let (mut a, _, b, _) = paired(&connector).await;

    a.send(PeerMessage::Disconnect {
        reason: "closing window".into(),
    })
    .await;
    assert_eq!(b.expect().await, PeerMessage::Withdrawal);
    // The relay closes the leaver's connection.
    assert_eq!(a.recv().await, None);
}

#[tokio::test]
async fn test_departed_waiting_player_is_never_paired() {
    let connector = start_memory_relay(RelayConfig::default());
    let mut a = TestClient::new(connector.connect().unwrap());
    a.hello("Tatu Ligeiro").await;
    a.send(PeerMessage::FindMatch).await;
    assert_eq!(a.expect().await, PeerMessage::Waiting);

    a.send(PeerMessage::Disconnect {
        reason: "gone".into(),
    })
    .await;
    // The connection closes only once the lobby has let go of `a`.
    assert_eq!(a.recv().await, None);

    let mut b = TestClient::new(connector.connect().unwrap());
    b.hello("Coruja Generosa").await;
    b.send(PeerMessage::FindMatch).await;
    assert_eq!(b.expect().await, PeerMessage::Waiting);
}

#[tokio::test]
async fn test_dropped_socket_sends_withdrawal_to_opponent() {
    let connector = start_memory_relay(RelayConfig::default());
    let (a, _, b, _) = paired(&connector).await;

    a.conn.close().await.unwrap();
    assert_eq!(b.expect().await, PeerMessage::Withdrawal);
}

#[tokio::test]
async fn test_leave_match_then_requeue() {
    let connector = start_memory_relay(RelayConfig::default());
    let (mut a, _, mut b, _) = paired(&connector).await;

    b.send(PeerMessage::LeaveMatch).await;
    assert_eq!(a.expect().await, PeerMessage::Withdrawal);

    // Both are free again; a third player can pair with either.
    a.send(PeerMessage::FindMatch).await;
    assert_eq!(a.expect().await, PeerMessage::Waiting);

    let mut c = TestClient::new(connector.connect().unwrap());
    c.hello("Dinossauro Bebê").await;
    c.send(PeerMessage::FindMatch).await;
    let sc = c.started().await;
    assert_eq!(sc.remote.name, "Mamute Generoso");
    assert_eq!(a.started().await, sc.flipped());
}

#[tokio::test]
async fn test_idle_connection_is_dropped() {
    let config = RelayConfig::default().with_idle_timeout(Duration::from_millis(100));
    let connector = start_memory_relay(config);
    let mut client = TestClient::new(connector.connect().unwrap());
    client.hello("Tigre Bebê").await;
    assert_eq!(client.recv().await, None);
}
