//! IRC message parsing and serialization.
//!
//! Lines have the RFC 2812 shape `[@tags] [:prefix] COMMAND [params] [:trailing]`.
//! IRCv3 tags are accepted on input and dropped; the bot never needs them.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::prefix::Prefix;
use crate::response::Response;

/// A single IRC protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message source, if the line carried one.
    pub prefix: Option<Prefix>,
    /// Command verb, uppercased, or a three-digit numeric.
    pub command: String,
    /// Parameters, with the trailing parameter (if any) last.
    pub params: Vec<String>,
}

impl Message {
    /// Build a message with no prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    pub fn pass(password: &str) -> Self {
        Self::new("PASS", vec![password.to_string()])
    }

    pub fn nick(nick: &str) -> Self {
        Self::new("NICK", vec![nick.to_string()])
    }

    /// `USER <user> 0 * :<realname>`
    pub fn user(user: &str, realname: &str) -> Self {
        Self::new(
            "USER",
            vec![
                user.to_string(),
                "0".to_string(),
                "*".to_string(),
                realname.to_string(),
            ],
        )
    }

    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", vec![channel.to_string()])
    }

    pub fn pong(token: &str) -> Self {
        Self::new("PONG", vec![token.to_string()])
    }

    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", vec![target.to_string(), text.to_string()])
    }

    pub fn quit(reason: &str) -> Self {
        Self::new("QUIT", vec![reason.to_string()])
    }

    /// Attach a source prefix.
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Nickname of the sender, if it was a user.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Parameter at `index`.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The numeric reply this message carries, if it is a known one.
    pub fn response(&self) -> Option<Response> {
        Response::from_command(&self.command)
    }

    /// Case-insensitive command comparison.
    pub fn is(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        if rest.starts_with('@') {
            rest = match rest.split_once(' ') {
                Some((_tags, after)) => after,
                None => return Err(ProtocolError::MissingCommand),
            };
        }
        rest = rest.trim_start_matches(' ');

        if rest.is_empty() {
            return Err(ProtocolError::EmptyMessage);
        }

        let prefix = if let Some(source) = rest.strip_prefix(':') {
            let (source, after) = source.split_once(' ').unwrap_or((source, ""));
            rest = after.trim_start_matches(' ');
            Some(Prefix::parse(source))
        } else {
            None
        };

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(ProtocolError::MissingCommand);
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, after) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param.to_string());
            rest = after;
        }

        Ok(Message {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }
}

/// Strip characters that would terminate or corrupt the line.
fn write_sanitized(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if s.contains(['\r', '\n', '\0']) {
        let clean: String = s.chars().filter(|c| !matches!(c, '\r' | '\n' | '\0')).collect();
        f.write_str(&clean)
    } else {
        f.write_str(s)
    }
}

impl fmt::Display for Message {
    /// Serializes without the CRLF terminator; [`IrcCodec`](crate::IrcCodec) adds it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;

        let Some((last, middle)) = self.params.split_last() else {
            return Ok(());
        };
        for param in middle {
            f.write_str(" ")?;
            write_sanitized(f, param)?;
        }
        if last.is_empty() || last.contains(' ') || last.starts_with(':') {
            f.write_str(" :")?;
        } else {
            f.write_str(" ")?;
        }
        write_sanitized(f, last)
    }
}
