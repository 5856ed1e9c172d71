//! Error types for the engine layer.
//!
//! Illegal *local* actions are not errors: the mutating calls return
//! `None` and the caller re-prompts. The variants here describe inbound
//! data the engine can't make sense of, which means the two peers no
//! longer agree on the board.

use quadring_protocol::{Movement, Position};

/// Errors raised while applying remote movements.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A remote movement referenced a cell outside the 4×4 grid.
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),

    /// A remote movement was well-formed but the local board refused it.
    #[error("remote movement could not be applied: {0:?}")]
    Desync(Movement),

    /// The match already ended; no further movements are accepted.
    #[error("match is over")]
    MatchOver,
}
