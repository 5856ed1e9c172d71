//! Matchmaking and move relay for Quadring.
//!
//! Peers never talk to each other directly. Each connects to a relay,
//! says `Hello`, asks to `FindMatch`, and from then on every `Move` it
//! sends is forwarded to its opponent untouched. The relay knows nothing
//! about the board: each peer runs its own engine and replays the
//! opponent's movements.
//!
//! # Key types
//!
//! - [`RelayServer`]: accept loop over any [`Transport`](quadring_transport::Transport)
//! - [`RelayConfig`]: bind address and timeouts
//! - [`Lobby`]: the waiting slot and the opponent map

mod config;
mod error;
mod handler;
mod lobby;
mod server;

pub use config::RelayConfig;
pub use error::RelayError;
pub use lobby::{Lobby, Outbox, Pairing};
pub use server::{RelayServer, RelayServerBuilder};
