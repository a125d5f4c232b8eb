//! IRC session logic.
//!
//! [`Bot`] consumes parsed server messages one at a time and returns the
//! lines to send back. It owns the connection-level state (current nick,
//! registration, channel roster) and hands PRIVMSG traffic to the
//! [`Router`]. The socket side lives in [`connection`].

pub mod connection;

pub use connection::{IrcStream, connect, run_session};

use infobot_proto::{Message, Response, irc_eq};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BotError;
use crate::membership::Membership;
use crate::router::{Incoming, Router};

/// Nicknames tried (the configured one plus `_`-suffixed retries) before
/// giving up on a nick collision.
const MAX_NICK_ATTEMPTS: usize = 3;

/// Text sent to the channel after rejoining from a kick.
fn rejoin_notice(kicker: &str) -> String {
    format!("{kicker}: I automatically rejoin to prevent people from accidentally kicking me.")
}

/// One bot session on one IRC connection.
pub struct Bot {
    server: String,
    nick: String,
    username: String,
    realname: String,
    password: Option<String>,
    channel: String,
    autorejoin: bool,
    registered: bool,
    nick_attempts: usize,
    membership: Arc<Membership>,
    router: Router,
}

impl Bot {
    pub fn new(config: &Config, router: Router) -> Self {
        Self {
            server: config.irc.host.clone(),
            nick: config.irc.nick.clone(),
            username: config.irc.username().to_string(),
            realname: config.irc.realname.clone(),
            password: config.irc.password.clone(),
            channel: config.channel.clone(),
            autorejoin: config.autorejoin,
            registered: false,
            nick_attempts: 1,
            membership: Arc::new(Membership::new(&config.channel)),
            router,
        }
    }

    /// The nickname the bot currently holds (or is trying to register).
    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn membership(&self) -> &Arc<Membership> {
        &self.membership
    }

    /// Lines that open the session: PASS (if configured), NICK, USER.
    pub fn handshake(&self) -> Vec<Message> {
        let mut out = Vec::with_capacity(3);
        if let Some(password) = &self.password {
            out.push(Message::pass(password));
        }
        out.push(Message::nick(&self.nick));
        out.push(Message::user(&self.username, &self.realname));
        out
    }

    fn is_me(&self, nick: &str) -> bool {
        irc_eq(nick, &self.nick)
    }

    fn roster_changed(&self) {
        crate::metrics::set_channel_members(self.membership.len());
    }

    /// Process one server message and return the lines to send.
    ///
    /// Returns an error only when the server ends the session.
    pub async fn handle(&mut self, msg: Message) -> Result<Vec<Message>, BotError> {
        if let Some(response) = msg.response() {
            return self.handle_numeric(response, &msg);
        }

        let out = match msg.command.as_str() {
            "PING" => vec![Message::pong(msg.param(0).unwrap_or_default())],
            "ERROR" => {
                let reason = msg.param(0).unwrap_or("connection closed").to_string();
                return Err(BotError::ServerClosed(reason));
            }
            "PRIVMSG" => self.handle_privmsg(&msg).await,
            "JOIN" => self.handle_join(&msg),
            "PART" => self.handle_part(&msg),
            "QUIT" => self.handle_quit(&msg),
            "KICK" => self.handle_kick(&msg),
            "NICK" => self.handle_nick(&msg),
            "MODE" => self.handle_mode(&msg),
            _ => Vec::new(),
        };
        Ok(out)
    }

    fn nick_rejected(&self, msg: &Message) -> BotError {
        BotError::NickRejected {
            nick: self.nick.clone(),
            reason: msg.params.last().cloned().unwrap_or_default(),
        }
    }

    fn handle_numeric(
        &mut self,
        response: Response,
        msg: &Message,
    ) -> Result<Vec<Message>, BotError> {
        let out = match response {
            Response::RPL_WELCOME => {
                if let Some(nick) = msg.param(0) {
                    self.nick = nick.to_string();
                }
                self.registered = true;
                info!(nick = %self.nick, channel = %self.channel, "Registered, joining channel");
                vec![Message::join(&self.channel)]
            }
            // A malformed nick stays malformed with a suffix.
            Response::ERR_ERRONEUSNICKNAME if !self.registered => {
                return Err(self.nick_rejected(msg));
            }
            Response::ERR_NICKNAMEINUSE if !self.registered => {
                if self.nick_attempts >= MAX_NICK_ATTEMPTS {
                    return Err(self.nick_rejected(msg));
                }
                self.nick_attempts += 1;
                let taken = std::mem::take(&mut self.nick);
                self.nick = format!("{taken}_");
                warn!(taken = %taken, next = %self.nick, "Nickname unavailable, retrying");
                vec![Message::nick(&self.nick)]
            }
            Response::RPL_NAMREPLY => {
                // <me> <symbol> <channel> :<names>
                if let (Some(channel), Some(names)) = (msg.param(2), msg.param(3))
                    && self.membership.tracks(channel)
                {
                    self.membership.add_names(names);
                }
                Vec::new()
            }
            Response::RPL_ENDOFNAMES => {
                if msg.param(1).is_some_and(|c| self.membership.tracks(c)) {
                    info!(members = self.membership.len(), "Channel roster loaded");
                    self.roster_changed();
                }
                Vec::new()
            }
            r if r.is_join_failure() => {
                warn!(
                    channel = %self.channel,
                    reason = msg.params.last().map(String::as_str).unwrap_or_default(),
                    "Could not join channel"
                );
                Vec::new()
            }
            _ => Vec::new(),
        };
        Ok(out)
    }

    async fn handle_privmsg(&self, msg: &Message) -> Vec<Message> {
        let (Some(sender), Some(target), Some(text)) =
            (msg.source_nick(), msg.param(0), msg.param(1))
        else {
            return Vec::new();
        };

        // CTCP (ACTION, VERSION, ...) is not for the directory.
        if text.starts_with('\x01') || self.is_me(sender) {
            return Vec::new();
        }

        let is_direct = self.is_me(target);
        if !is_direct && !self.membership.tracks(target) {
            debug!(target = %target, "Ignoring message for untracked target");
            return Vec::new();
        }

        let incoming = Incoming {
            sender,
            channel: target,
            text,
            is_direct,
        };
        let roster = self.membership.snapshot();

        match self.router.handle(&incoming, &roster).await {
            Some(reply) => vec![Message::privmsg(&reply.target, &reply.text)],
            None => Vec::new(),
        }
    }

    fn handle_join(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(nick), Some(channel)) = (msg.source_nick(), msg.param(0)) else {
            return Vec::new();
        };
        if !self.membership.tracks(channel) {
            return Vec::new();
        }

        if self.is_me(nick) {
            // A NAMES burst follows our own JOIN and rebuilds the roster.
            self.membership.clear();
            info!(channel = %channel, "Joined channel");
        } else {
            self.membership.join(nick);
        }
        self.roster_changed();
        Vec::new()
    }

    fn handle_part(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(nick), Some(channel)) = (msg.source_nick(), msg.param(0)) else {
            return Vec::new();
        };
        if !self.membership.tracks(channel) {
            return Vec::new();
        }

        if self.is_me(nick) {
            warn!(channel = %channel, "Left channel");
            self.membership.clear();
        } else {
            self.membership.remove(nick);
        }
        self.roster_changed();
        Vec::new()
    }

    fn handle_quit(&mut self, msg: &Message) -> Vec<Message> {
        if let Some(nick) = msg.source_nick() {
            self.membership.remove(nick);
            self.roster_changed();
        }
        Vec::new()
    }

    fn handle_kick(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(channel), Some(kicked)) = (msg.param(0), msg.param(1)) else {
            return Vec::new();
        };
        if !self.membership.tracks(channel) {
            return Vec::new();
        }
        let kicker = msg.source_nick().unwrap_or(channel);

        if !self.is_me(kicked) {
            self.membership.remove(kicked);
            self.roster_changed();
            return Vec::new();
        }

        self.membership.clear();
        self.roster_changed();

        if self.autorejoin {
            info!(by = %kicker, channel = %channel, "Kicked from channel, rejoining");
            vec![
                Message::join(&self.channel),
                Message::privmsg(&self.channel, &rejoin_notice(kicker)),
            ]
        } else {
            warn!(by = %kicker, channel = %channel, "Kicked from channel");
            Vec::new()
        }
    }

    fn handle_nick(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(old), Some(new)) = (msg.source_nick(), msg.param(0)) else {
            return Vec::new();
        };
        if self.is_me(old) {
            info!(old = %old, new = %new, "Nickname changed");
            self.nick = new.to_string();
        }
        self.membership.rename(old, new);
        Vec::new()
    }

    fn handle_mode(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(target), Some(modestring)) = (msg.param(0), msg.param(1)) else {
            return Vec::new();
        };
        if self.membership.tracks(target) {
            self.membership.apply_modes(modestring, &msg.params[2..]);
        }
        Vec::new()
    }
}
