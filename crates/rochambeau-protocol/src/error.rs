//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating wire
/// messages.
///
/// None of these is fatal. The gateway logs them and drops the frame, and
/// for malformed requests it may answer the sender with an `error`
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, unknown `type`, missing or
    /// mistyped fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A `move` value outside rock/paper/scissors. Logged and dropped,
    /// never reported to the other participant.
    #[error("invalid move: {0:?}")]
    InvalidMove(String),

    /// The frame parsed but breaks a protocol rule, such as a blank room
    /// code.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
