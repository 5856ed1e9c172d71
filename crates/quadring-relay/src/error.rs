//! Error types for the relay.

use quadring_protocol::{PlayerId, ProtocolError};
use quadring_transport::TransportError;

/// Errors raised while serving a connection or updating the lobby.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection never completed its `Hello`.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The player asked for a match while already playing one.
    #[error("player {0} is already in a match")]
    AlreadyInMatch(PlayerId),

    /// The player sent a match message without an opponent.
    #[error("player {0} is not in a match")]
    NotInMatch(PlayerId),

    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),
}

impl RelayError {
    /// HTTP-style code sent back to the client in `PeerMessage::Error`.
    pub fn code(&self) -> u16 {
        match self {
            Self::Handshake(_) | Self::Protocol(_) => 400,
            Self::UnknownPlayer(_) => 404,
            Self::AlreadyInMatch(_) | Self::NotInMatch(_) => 409,
            Self::Transport(_) => 500,
        }
    }
}
