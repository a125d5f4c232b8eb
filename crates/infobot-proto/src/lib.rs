//! IRC protocol primitives for infobot.
//!
//! Only the client-side subset a channel bot needs: parsing and serializing
//! lines, message source prefixes, the numerics the bot reacts to, nickname
//! case mapping, and a tokio codec that frames lines into [`Message`]s.

pub mod casemap;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod error;
pub mod message;
pub mod prefix;
pub mod response;

pub use casemap::{irc_eq, irc_lower_char, irc_to_lower};
#[cfg(feature = "tokio")]
pub use codec::IrcCodec;
pub use error::{ProtocolError, Result};
pub use message::Message;
pub use prefix::Prefix;
pub use response::Response;
