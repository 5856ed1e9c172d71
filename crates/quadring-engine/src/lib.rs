//! Game engine for Quadring.
//!
//! Two players share a 4×4 board and a supply of red, green and blue
//! rings. On their turn a player either places a ring from their reserve
//! or slides the whole content of one cell in a straight, unobstructed
//! line to an empty cell. The first line of four cells holding identical,
//! non-empty ring sets ends the match.
//!
//! # Key types
//!
//! - [`Board`]: the grid, legality checks, and line detection
//! - [`Player`]: name, identity, and ring reserve
//! - [`GameMatch`]: one match: turn state machine, local and remote
//!   movement application
//!
//! Each peer runs its own [`GameMatch`]. The mover applies an action
//! locally and sends the resulting [`Movement`](quadring_protocol::Movement);
//! the other peer replays it with [`GameMatch::receive_move`]. Both then
//! call [`GameMatch::evaluate_round`] and reach the same verdict.
//!
//! The engine is synchronous and has no interior mutability: whoever owns
//! the `GameMatch` serializes access to it.

mod board;
mod error;
mod game_match;
mod player;

pub use board::{BOARD_SIZE, Board, Cell, Line, LineKind, RingSet};
pub use error::EngineError;
pub use game_match::{GameMatch, MatchOutcome, MatchPhase, Side};
pub use player::{INITIAL_RESERVE, Player};
