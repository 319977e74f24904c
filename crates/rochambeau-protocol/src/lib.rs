//! Wire protocol for Rochambeau.
//!
//! This crate defines the "language" that participants and the server
//! speak:
//!
//! - **Types** ([`ParticipantId`], [`RoomId`], [`Move`], score and move
//!   entries): the values carried inside messages.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): one closed
//!   variant per event the server accepts or emits.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) and the inbound validation
//!   choke point [`decode_client_message`].
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Session coordinator
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, decode_client_message, encode_client_message};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ChatKind, ClientMessage, ServerMessage};
pub use types::{
    Move, MoveEntry, ParticipantId, ParticipantInfo, Recipient, RoomId,
    RoomState, ScoreEntry,
};

/// The current protocol version, announced in
/// [`ServerMessage::Connected`].
pub const PROTOCOL_VERSION: u32 = 1;
