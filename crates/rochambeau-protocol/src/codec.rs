//! Codec trait, the JSON implementation, and the inbound validation
//! choke point.
//!
//! The gateway never deserializes a [`ClientMessage`] by hand: every
//! inbound frame goes through [`decode_client_message`], which is the one
//! place where malformed payloads and invalid moves are detected.

use serde::{Serialize, de::DeserializeOwned};

use crate::messages::WireClientMessage;
use crate::{ClientMessage, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
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
/// JSON is what browser clients speak natively, so it is the default.
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use rochambeau_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let bytes = JsonCodec.encode(&ServerMessage::RematchStart).unwrap();
/// assert_eq!(bytes, br#"{"type":"rematch-start"}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Boundary helpers
// ---------------------------------------------------------------------------

/// Decodes and validates one inbound frame.
///
/// # Errors
/// - `ProtocolError::Decode`: not a recognizable client message
/// - `ProtocolError::InvalidMove`: a `move` outside rock/paper/scissors
/// - `ProtocolError::InvalidMessage`: e.g. a blank room code
pub fn decode_client_message<C: Codec>(
    codec: &C,
    data: &[u8],
) -> Result<ClientMessage, ProtocolError> {
    let wire: WireClientMessage = codec.decode(data)?;
    ClientMessage::try_from(wire)
}

/// Encodes a client message in its wire form. Used by clients and tests.
///
/// # Errors
/// Returns `ProtocolError::Encode` if serialization fails.
pub fn encode_client_message<C: Codec>(
    codec: &C,
    msg: &ClientMessage,
) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(&WireClientMessage::from(msg))
}
