//! Error types for the protocol layer.
//!
//! Each crate in Quadring defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in encoding or decoding, not
//! in the board rules or the network.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, a ring
    /// color other than red/green/blue, or a move type other than 0/1.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules, e.g. a
    /// ring placement record without a `ring_type`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
