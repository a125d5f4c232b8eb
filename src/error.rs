//! Unified error handling for infobot.
//!
//! Session-level failures live here. Store failures are reported per
//! command (see [`crate::store::StoreError`]) and never end the session.

use infobot_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Session Errors (connection lifecycle)
// ============================================================================

/// Errors that end an IRC session.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("connection closed by server")]
    Disconnected,

    #[error("server closed the session: {0}")]
    ServerClosed(String),

    #[error("server refused nickname {nick}: {reason}")]
    NickRejected { nick: String, reason: String },
}

impl BotError {
    /// Get a static error code for metrics/logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Tls(_) => "tls",
            Self::Protocol(_) => "protocol",
            Self::Disconnected => "disconnected",
            Self::ServerClosed(_) => "server_closed",
            Self::NickRejected { .. } => "nick_rejected",
        }
    }
}
