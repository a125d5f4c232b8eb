//! Command router.
//!
//! Turns one chat message into at most one reply line: parse against the
//! pattern table, check the caller's privileges against a roster snapshot,
//! run the directory operation, and word the outcome. Authorization and
//! not-found outcomes become reply text here; only store faults are logged
//! as errors, and even those end in a reply rather than an error upward.

mod command;
mod handlers;
pub mod replies;

pub use command::{Command, UsageTopic};

use tracing::{Instrument, error, trace};

use crate::directory::Directory;
use crate::membership::RosterSnapshot;
use crate::telemetry::{CommandTimer, spans};

/// An inbound chat message.
#[derive(Debug, Clone, Copy)]
pub struct Incoming<'a> {
    /// Nickname of the sender.
    pub sender: &'a str,
    /// Channel the message arrived in (or the bot's nick for a DM).
    pub channel: &'a str,
    pub text: &'a str,
    /// Sent privately to the bot rather than to the channel.
    pub is_direct: bool,
}

/// One outbound reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Channel or nickname to send to.
    pub target: String,
    pub text: String,
}

/// Directory command router for one channel.
#[derive(Clone)]
pub struct Router {
    directory: Directory,
    channel: String,
}

impl Router {
    /// `channel` is the channel whose operators may moderate the directory,
    /// whichever channel or DM a command arrives through.
    pub fn new(directory: Directory, channel: &str) -> Self {
        Self {
            directory,
            channel: channel.to_string(),
        }
    }

    /// Handle one message. `None` means the message was not a command.
    pub async fn handle(&self, msg: &Incoming<'_>, roster: &RosterSnapshot) -> Option<Reply> {
        let Some(command) = Command::parse(msg.text) else {
            trace!(sender = %msg.sender, "Not a command");
            return None;
        };

        let kind = command.kind();
        let target = if msg.is_direct { msg.sender } else { msg.channel };
        let _timer = CommandTimer::new(kind);

        let text = match self
            .execute(command, msg.sender, roster)
            .instrument(spans::command(kind, msg.sender))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!(command = kind, sender = %msg.sender, error = %e, "Directory command failed");
                crate::metrics::record_command_error(kind, e.error_code());
                replies::STORE_FAILURE.to_string()
            }
        };

        Some(Reply {
            target: target.to_string(),
            text,
        })
    }

    /// Whether `nick` is an operator of the directory's channel right now.
    fn is_operator(&self, roster: &RosterSnapshot, nick: &str) -> bool {
        roster.is_operator(&self.channel, nick)
    }
}
