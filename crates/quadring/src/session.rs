//! Peer sessions: one engine instance driven over a relay connection.
//!
//! ```text
//!   PeerClient::handshake ──► PeerClient::find_match ──► MatchSession
//!        Hello/Welcome            FindMatch/MatchStarted     Move/Withdrawal
//! ```
//!
//! A [`MatchSession`] owns its [`GameMatch`] outright. Local actions go
//! through [`MatchSession::place_ring`] / [`MatchSession::move_cell_content`],
//! which apply the action, close the round, and send the movement.
//! Remote actions arrive through [`MatchSession::next_event`].

use std::time::Duration;

use quadring_engine::{GameMatch, MatchOutcome, Side};
use quadring_protocol::{
    Codec, Envelope, JsonCodec, MatchStatus, Movement, PROTOCOL_VERSION, PeerMessage, PlayerId,
    Position, RingType, StartStatus,
};
use quadring_transport::{ClientWebSocketConnection, Connection};

use crate::{QuadringError, SessionError, names};

/// Settings for connecting to a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the relay, e.g. `ws://127.0.0.1:9000`.
    pub server_url: String,
    /// Display name announced in `Hello`.
    pub name: String,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    /// Loopback relay and a freshly drawn random name.
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:9000".to_string(),
            name: names::random_player_name(&mut rand::rng()),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// PeerClient
// ---------------------------------------------------------------------------

/// A connection to the relay that has completed its handshake.
pub struct PeerClient<Conn: Connection, C: Codec = JsonCodec> {
    conn: Conn,
    codec: C,
    seq: u64,
    player_id: PlayerId,
    name: String,
}

impl PeerClient<ClientWebSocketConnection> {
    /// Dials the relay named in `config` and performs the handshake.
    pub async fn connect(config: &ClientConfig) -> Result<Self, QuadringError> {
        let conn = tokio::time::timeout(
            config.connect_timeout,
            quadring_transport::connect(&config.server_url),
        )
        .await
        .map_err(|_| {
            SessionError::Handshake(format!("timed out connecting to {}", config.server_url))
        })??;
        Self::handshake(conn, &config.name).await
    }
}

impl<Conn: Connection> PeerClient<Conn> {
    /// Sends `Hello` over an open connection and waits for `Welcome`,
    /// using the JSON codec.
    pub async fn handshake(conn: Conn, name: &str) -> Result<Self, QuadringError> {
        Self::handshake_with_codec(conn, JsonCodec, name).await
    }
}

impl<Conn: Connection, C: Codec> PeerClient<Conn, C> {
    pub async fn handshake_with_codec(
        conn: Conn,
        codec: C,
        name: &str,
    ) -> Result<Self, QuadringError> {
        let mut client = Self {
            conn,
            codec,
            seq: 0,
            player_id: PlayerId(0),
            name: name.to_string(),
        };
        client
            .send(PeerMessage::Hello {
                version: PROTOCOL_VERSION,
                name: name.to_string(),
            })
            .await?;

        match client.recv().await? {
            Some(PeerMessage::Welcome { player_id }) => {
                client.player_id = player_id;
                tracing::info!(%player_id, name, "connected to relay");
                Ok(client)
            }
            Some(PeerMessage::Error { code, message }) => {
                Err(SessionError::Handshake(format!("relay refused ({code}): {message}")).into())
            }
            Some(other) => {
                Err(SessionError::Handshake(format!("expected Welcome, got {other:?}")).into())
            }
            None => Err(SessionError::Handshake("relay closed the connection".into()).into()),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks the relay for an opponent and waits until the match starts.
    ///
    /// # Errors
    /// [`SessionError::MatchNotStarted`] if the relay answers with an
    /// error or drops the connection first.
    pub async fn find_match(mut self) -> Result<MatchSession<Conn, C>, QuadringError> {
        self.send(PeerMessage::FindMatch).await?;
        loop {
            match self.recv().await? {
                Some(PeerMessage::Waiting) => {
                    tracing::info!(player_id = %self.player_id, "waiting for an opponent");
                }
                Some(PeerMessage::MatchStarted { start }) => {
                    return Ok(MatchSession::new(self, start));
                }
                Some(PeerMessage::Error { code, message }) => {
                    return Err(SessionError::MatchNotStarted(format!("{code}: {message}")).into());
                }
                Some(other) => {
                    tracing::debug!(?other, "ignoring message while matchmaking");
                }
                None => {
                    return Err(SessionError::MatchNotStarted("relay closed the connection".into())
                        .into());
                }
            }
        }
    }

    /// Says goodbye to the relay and closes the connection.
    pub async fn disconnect(mut self, reason: &str) -> Result<(), QuadringError> {
        self.send(PeerMessage::Disconnect {
            reason: reason.to_string(),
        })
        .await?;
        self.conn.close().await?;
        Ok(())
    }

    async fn send(&mut self, message: PeerMessage) -> Result<(), QuadringError> {
        let envelope = Envelope {
            seq: self.seq,
            message,
        };
        self.seq += 1;
        let bytes = self.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// `Ok(None)` once the relay closed the connection.
    async fn recv(&self) -> Result<Option<PeerMessage>, QuadringError> {
        let Some(data) = self.conn.recv().await? else {
            return Ok(None);
        };
        let envelope: Envelope = self.codec.decode(&data)?;
        Ok(Some(envelope.message))
    }
}

// ---------------------------------------------------------------------------
// MatchSession
// ---------------------------------------------------------------------------

/// Something the opponent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The opponent's movement was applied to the local board.
    RemoteMoved(Movement),
    /// The opponent left; the match is over.
    OpponentEscaped,
}

/// One match in progress, seen from the local player.
pub struct MatchSession<Conn: Connection, C: Codec = JsonCodec> {
    client: PeerClient<Conn, C>,
    game: GameMatch,
    start: StartStatus,
}

impl<Conn: Connection, C: Codec> MatchSession<Conn, C> {
    fn new(client: PeerClient<Conn, C>, start: StartStatus) -> Self {
        tracing::info!(
            local = %start.local.name,
            remote = %start.remote.name,
            first = start.local_moves_first(),
            "match started"
        );
        Self {
            game: GameMatch::from_start(&start),
            client,
            start,
        }
    }

    pub fn game(&self) -> &GameMatch {
        &self.game
    }

    pub fn start_status(&self) -> &StartStatus {
        &self.start
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.game.outcome()
    }

    /// Places a ring from the local reserve and sends the movement.
    ///
    /// # Errors
    /// `MatchOver`, `NotYourTurn`, `OutOfRings` or `IllegalAction`, all
    /// without touching the match; or a transport/codec error if the
    /// movement could not be sent, which ends the match as a withdrawal.
    pub async fn place_ring(
        &mut self,
        ring: RingType,
        destination: Position,
    ) -> Result<Movement, QuadringError> {
        self.ensure_local_turn()?;
        if !self.game.local_player().has_ring(ring) {
            return Err(SessionError::OutOfRings(ring).into());
        }
        let movement = self
            .game
            .place_ring(ring, destination, Side::Local)
            .ok_or(SessionError::IllegalAction)?;
        self.finish_local_action(movement).await
    }

    /// Slides a cell's content and sends the movement.
    pub async fn move_cell_content(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Result<Movement, QuadringError> {
        self.ensure_local_turn()?;
        let movement = self
            .game
            .move_cell_content(origin, destination)
            .ok_or(SessionError::IllegalAction)?;
        self.finish_local_action(movement).await
    }

    fn ensure_local_turn(&self) -> Result<(), SessionError> {
        if self.game.is_finished() {
            return Err(SessionError::MatchOver);
        }
        if !self.game.is_local_turn() {
            return Err(SessionError::NotYourTurn);
        }
        Ok(())
    }

    async fn finish_local_action(&mut self, movement: Movement) -> Result<Movement, QuadringError> {
        let status = match self.game.evaluate_round() {
            Some(_) => MatchStatus::Finished,
            None => MatchStatus::Next,
        };
        let movement = movement.with_match_status(status);
        if let Err(e) = self.client.send(PeerMessage::Move { movement }).await {
            tracing::error!(error = %e, ?movement, "cannot send movement, ending match");
            self.game.receive_withdrawal();
            return Err(e);
        }
        Ok(movement)
    }

    /// Waits for the opponent's next action and applies it.
    ///
    /// Cancel safe: a message is only consumed by the call that returns
    /// it, so this can sit in a `tokio::select!` next to user input.
    ///
    /// A movement the local board cannot replay ends the match as a
    /// withdrawal and returns the engine error.
    pub async fn next_event(&mut self) -> Result<SessionEvent, QuadringError> {
        if self.game.is_finished() {
            return Err(SessionError::MatchOver.into());
        }
        loop {
            match self.client.recv().await? {
                Some(PeerMessage::Move { movement }) => {
                    if let Err(e) = self.game.receive_move(&movement) {
                        tracing::error!(error = %e, "cannot replay remote movement, ending match");
                        self.game.receive_withdrawal();
                        return Err(e.into());
                    }
                    let ended = self.game.evaluate_round().is_some();
                    let announced = movement.match_status() == Some(MatchStatus::Finished);
                    if ended != announced {
                        tracing::debug!(ended, announced, "remote match status disagrees");
                    }
                    return Ok(SessionEvent::RemoteMoved(movement));
                }
                Some(PeerMessage::Withdrawal) | None => {
                    self.game.receive_withdrawal();
                    return Ok(SessionEvent::OpponentEscaped);
                }
                Some(PeerMessage::Error { code, message }) => {
                    tracing::warn!(code, %message, "relay reported an error");
                }
                Some(other) => {
                    tracing::debug!(?other, "ignoring message during match");
                }
            }
        }
    }

    /// Leaves the match and hands the connection back, ready for another
    /// `find_match`. If the match was still running the opponent sees a
    /// withdrawal.
    pub async fn leave(self) -> Result<PeerClient<Conn, C>, QuadringError> {
        let mut client = self.client;
        client.send(PeerMessage::LeaveMatch).await?;
        Ok(client)
    }
}
