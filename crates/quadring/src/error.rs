//! Unified error type for Quadring.

use quadring_engine::EngineError;
use quadring_protocol::{ProtocolError, RingType};
use quadring_relay::RelayError;
use quadring_transport::TransportError;

/// Errors raised by a peer session before or during a match.
///
/// The local-action variants (`NotYourTurn`, `OutOfRings`,
/// `IllegalAction`, `MatchOver`) leave the match untouched: the front end
/// shows the message and asks again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The relay refused or never answered our `Hello`.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Matchmaking ended without a `MatchStarted`.
    #[error("match not started: {0}")]
    MatchNotStarted(String),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("the match is over")]
    MatchOver,

    #[error("no {0} rings left")]
    OutOfRings(RingType),

    /// The board refused the placement or slide.
    #[error("illegal action")]
    IllegalAction,
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuadringError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl QuadringError {
    /// `true` for refusals of a local action, after which the match goes
    /// on unchanged.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Session(
                SessionError::NotYourTurn
                    | SessionError::OutOfRings(_)
                    | SessionError::IllegalAction
            )
        )
    }
}
