//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Nothing above this layer cares HOW messages are serialized; it only
//! needs something that implements [`Codec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` lets one codec value live inside long-running
/// tokio tasks and be shared between them.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type. Semantic failures
    /// raised by `TryFrom` conversions (for example a movement record
    /// missing its origin) surface here too.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Movement records come out as flat objects:
/// `{"type": 0, "destination": [1, 2], ...}`.
///
/// ## Example
///
/// ```rust
/// use quadring_protocol::{Codec, JsonCodec, Movement, Position, RingType};
///
/// let codec = JsonCodec;
/// let movement = Movement::place_ring(Position::new(1, 2), RingType::Red);
///
/// let bytes = codec.encode(&movement).unwrap();
/// let decoded: Movement = codec.decode(&bytes).unwrap();
/// assert_eq!(movement, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
