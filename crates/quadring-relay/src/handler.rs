//! Per-connection handler: handshake, lobby registration, message routing.
//!
//! Each accepted connection gets its own task running this handler:
//!   1. Receive `Hello` → validate version → send `Welcome`
//!   2. Register in the lobby with an outbox; a writer task drains it
//!   3. Loop: `FindMatch` / `Move` / `LeaveMatch` / `Disconnect`
//!
//! Leaving the loop for any reason (clean close, error, idle timeout)
//! removes the player from the lobby before the handler returns, which
//! sends `Withdrawal` to its opponent.

use std::sync::Arc;

use quadring_protocol::{Codec, Envelope, PROTOCOL_VERSION, PeerMessage, PlayerId};
use quadring_transport::Connection;
use tokio::sync::mpsc;

use crate::server::RelayState;
use crate::{Lobby, Outbox, Pairing, RelayError};

/// Removes the player from the lobby if the handler unwinds before its
/// own cleanup ran. `Drop` is synchronous, so the async lock happens in a
/// fire-and-forget task.
struct LobbyGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<RelayState<C>>,
    removed: bool,
}

impl<C: Codec> LobbyGuard<C> {
    /// Takes the player out of the lobby before returning, so nobody can
    /// be paired with it afterwards.
    async fn remove(mut self) {
        self.state.lobby.lock().await.remove(self.player_id);
        self.removed = true;
        tracing::debug!(player_id = %self.player_id, "removed from lobby");
    }
}

impl<C: Codec> Drop for LobbyGuard<C> {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.lobby.lock().await.remove(player_id);
            tracing::debug!(%player_id, "removed from lobby");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Conn, C>(
    conn: Conn,
    state: Arc<RelayState<C>>,
) -> Result<(), RelayError>
where
    Conn: Connection,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (player_id, name) = perform_handshake(&*conn, &state).await?;
    tracing::info!(%conn_id, %player_id, %name, "player connected");

    let (outbox, inbox) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(Arc::clone(&conn), inbox, Arc::clone(&state), player_id));

    state.lobby.lock().await.register(player_id, name, outbox.clone());
    let guard = LobbyGuard {
        player_id,
        state: Arc::clone(&state),
        removed: false,
    };

    loop {
        let data = match tokio::time::timeout(state.config.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle for too long");
                break;
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode envelope");
                reply_error(&outbox, &RelayError::Protocol(e));
                continue;
            }
        };

        match envelope.message {
            PeerMessage::FindMatch => {
                let result = {
                    let mut lobby = state.lobby.lock().await;
                    pair(&mut lobby, player_id)
                };
                match result {
                    Ok(Pairing::Waiting) => {
                        let _ = outbox.send(PeerMessage::Waiting);
                    }
                    // Both sides already got their MatchStarted.
                    Ok(Pairing::Started { .. }) => {}
                    Err(e) => reply_error(&outbox, &e),
                }
            }

            PeerMessage::Move { movement } => {
                let result = state
                    .lobby
                    .lock()
                    .await
                    .forward(player_id, PeerMessage::Move { movement });
                match result {
                    Ok(to) => tracing::debug!(from = %player_id, %to, ?movement, "move forwarded"),
                    Err(e) => reply_error(&outbox, &e),
                }
            }

            PeerMessage::LeaveMatch => {
                state.lobby.lock().await.leave_match(player_id);
            }

            PeerMessage::Disconnect { reason } => {
                tracing::info!(%player_id, %reason, "client disconnected");
                break;
            }

            other => {
                tracing::debug!(%player_id, ?other, "ignoring unexpected message");
                reply_error(
                    &outbox,
                    &RelayError::Protocol(quadring_protocol::ProtocolError::InvalidMessage(
                        "unexpected message from client".into(),
                    )),
                );
            }
        }
    }

    // Opponent, if any, gets Withdrawal.
    guard.remove().await;
    Ok(())
}

fn pair(lobby: &mut Lobby, player_id: PlayerId) -> Result<Pairing, RelayError> {
    lobby.find_match(player_id, &mut rand::rng())
}

fn reply_error(outbox: &Outbox, error: &RelayError) {
    let _ = outbox.send(PeerMessage::Error {
        code: error.code(),
        message: error.to_string(),
    });
}

/// Drains the player's outbox onto the socket. Ends, closing the
/// connection, once every sender is gone (the handler exited and the
/// lobby forgot the player) or a send fails.
async fn write_loop<Conn, C>(
    conn: Arc<Conn>,
    mut inbox: mpsc::UnboundedReceiver<PeerMessage>,
    state: Arc<RelayState<C>>,
    player_id: PlayerId,
) where
    Conn: Connection,
    C: Codec,
{
    // seq 0 went out with Welcome.
    let mut seq: u64 = 1;
    while let Some(message) = inbox.recv().await {
        let envelope = Envelope {
            seq: next_seq(&mut seq),
            message,
        };
        let bytes = match state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "failed to encode envelope");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%player_id, error = %e, "send failed, writer stopping");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Receives `Hello`, validates it, and answers `Welcome`.
async fn perform_handshake<Conn, C>(
    conn: &Conn,
    state: &RelayState<C>,
) -> Result<(PlayerId, String), RelayError>
where
    Conn: Connection,
    C: Codec,
{
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(RelayError::Handshake("connection closed before Hello".into()));
        }
        Ok(Err(e)) => return Err(RelayError::Transport(e)),
        Err(_) => return Err(RelayError::Handshake("Hello timed out".into())),
    };

    let envelope: Envelope = match state.codec.decode(&data) {
        Ok(env) => env,
        Err(e) => {
            let err = RelayError::Protocol(e);
            send_error(conn, &state.codec, &err).await?;
            return Err(err);
        }
    };

    let (version, name) = match envelope.message {
        PeerMessage::Hello { version, name } => (version, name),
        _ => {
            let err = RelayError::Handshake("first message must be Hello".into());
            send_error(conn, &state.codec, &err).await?;
            return Err(err);
        }
    };

    if version != PROTOCOL_VERSION {
        let err = RelayError::Handshake(format!(
            "version mismatch: expected {PROTOCOL_VERSION}, got {version}"
        ));
        send_error(conn, &state.codec, &err).await?;
        return Err(err);
    }

    let player_id = state.assign_player_id();
    let name = match name.trim() {
        "" => player_id.to_string(),
        trimmed => trimmed.to_string(),
    };

    let welcome = Envelope {
        seq: 0,
        message: PeerMessage::Welcome { player_id },
    };
    conn.send(&state.codec.encode(&welcome)?).await?;

    Ok((player_id, name))
}

/// Sends an `Error` envelope straight to the socket, for failures before
/// the writer task exists.
async fn send_error<Conn: Connection>(
    conn: &Conn,
    codec: &impl Codec,
    error: &RelayError,
) -> Result<(), RelayError> {
    let envelope = Envelope {
        seq: 0,
        message: PeerMessage::Error {
            code: error.code(),
            message: error.to_string(),
        },
    };
    conn.send(&codec.encode(&envelope)?).await?;
    Ok(())
}

fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
