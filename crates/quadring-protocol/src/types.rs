//! Core protocol types for Quadring's wire format.
//!
//! Every type in this module travels "on the wire": it gets serialized,
//! sent through the relay, and deserialized by the other peer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Movement, ProtocolError};

/// The protocol version. Clients send it in [`PeerMessage::Hello`] and the
/// relay rejects anything else.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, assigned by the relay.
///
/// Newtype wrapper so a player id can't be confused with a sequence
/// number or a reserve count. `#[serde(transparent)]` keeps it a plain
/// number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Board vocabulary
// ---------------------------------------------------------------------------

/// A `(row, col)` coordinate.
///
/// On the wire a position is a two-element array, `[row, col]`. The
/// `from`/`into` attributes route serde through `[u8; 2]` so the Rust
/// side can keep named fields.
///
/// A position is only a pair of numbers: decoding `[7, 0]` succeeds, and
/// it's up to the board to say that row 7 doesn't exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl From<[u8; 2]> for Position {
    fn from([row, col]: [u8; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Position> for [u8; 2] {
    fn from(pos: Position) -> Self {
        [pos.row, pos.col]
    }
}

impl From<(u8, u8)> for Position {
    fn from((row, col): (u8, u8)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The three ring colors.
///
/// `rename_all = "lowercase"` gives the wire names `"red"`, `"green"`,
/// `"blue"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingType {
    Red,
    Green,
    Blue,
}

impl RingType {
    /// Every color, in display order.
    pub const ALL: [RingType; 3] = [RingType::Red, RingType::Green, RingType::Blue];

    /// The wire name of this color.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for RingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the wire names and their first letters, case-insensitively.
impl FromStr for RingType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "blue" | "b" => Ok(Self::Blue),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown ring color: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Match start metadata
// ---------------------------------------------------------------------------

/// One participant as announced by the relay when a match starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    /// Display name chosen by the player.
    pub name: String,
    /// Relay-assigned identity.
    pub id: PlayerId,
    /// Turn order: `1` moves first, `2` moves second.
    pub order: u8,
}

/// Match-start metadata, always expressed from the recipient's point of
/// view: `local` is the player receiving this message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStatus {
    pub local: PlayerSeat,
    pub remote: PlayerSeat,
}

impl StartStatus {
    /// Returns `true` if the local player makes the first move.
    pub fn local_moves_first(&self) -> bool {
        self.local.order == 1
    }

    /// The same match seen from the other seat.
    pub fn flipped(&self) -> Self {
        Self {
            local: self.remote.clone(),
            remote: self.local.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// PeerMessage: everything a client and the relay say to each other
// ---------------------------------------------------------------------------

/// Messages exchanged between a game client and the relay.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "Hello", "version": 1, "name": "Tigre Veloz" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeerMessage {
    // -- Connection lifecycle --

    /// Client → Relay: "Hello, I want to play."
    Hello { version: u32, name: String },

    /// Relay → Client: "Welcome, this is your identity."
    Welcome { player_id: PlayerId },

    /// Either direction: "I'm disconnecting."
    Disconnect { reason: String },

    // -- Matchmaking --

    /// Client → Relay: "Pair me with the next available opponent."
    FindMatch,

    /// Relay → Client: "You're queued, nobody to pair with yet."
    Waiting,

    /// Relay → Client: "Your match started."
    MatchStarted { start: StartStatus },

    /// Client → Relay: "I'm abandoning my current match."
    LeaveMatch,

    // -- Play --

    /// Either direction: one completed action. The relay forwards it to
    /// the sender's opponent untouched.
    Move { movement: Movement },

    /// Relay → Client: "Your opponent left the match."
    Withdrawal,

    // -- Errors --

    /// Relay → Client: "Something went wrong."
    /// `code` follows HTTP-style conventions (400, 404, 409...).
    Error { code: u16, message: String },
}

/// The top-level message wrapper. Every message on the wire is an Envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Auto-incrementing sequence number, one counter per sender.
    pub seq: u64,

    /// The actual message content.
    pub message: PeerMessage,
}

// =========================================================================
// Tests
// =========================================================================
