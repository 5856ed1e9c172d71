//! Wire protocol for Quadring.
//!
//! This crate defines the "language" two game clients and the relay speak:
//!
//! - **Board vocabulary** ([`Position`], [`RingType`]): the coordinates
//!   and ring colors every other layer talks about.
//! - **Movements** ([`Movement`], [`MoveKind`], [`MatchStatus`]): one
//!   completed action, in the flat record shape both peers agree on.
//! - **Peer messages** ([`Envelope`], [`PeerMessage`], [`StartStatus`]):
//!   handshake, matchmaking, move forwarding, and withdrawal.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Engine (board state)
//! ```
//!
//! The protocol layer doesn't know about rules: it will happily decode a
//! position at row 9. Deciding whether a movement is legal is the
//! engine's job.

mod codec;
mod error;
mod movement;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use movement::{Action, MatchStatus, MoveKind, Movement};
pub use types::{
    Envelope, PeerMessage, PlayerId, PlayerSeat, Position, RingType,
    StartStatus, PROTOCOL_VERSION,
};
