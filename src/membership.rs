//! Channel roster with member privilege flags.
//!
//! The bot session keeps the roster current from NAMES replies and
//! JOIN/PART/QUIT/KICK/NICK/MODE traffic. Command handling never touches the
//! live roster: it gets a [`RosterSnapshot`], an immutable structurally-shared
//! copy taken when the command arrives.

use infobot_proto::{irc_eq, irc_to_lower};
use parking_lot::RwLock;

/// Per-member channel privileges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberModes {
    pub owner: bool,  // +q (~)
    pub admin: bool,  // +a (&)
    pub op: bool,     // +o (@)
    pub halfop: bool, // +h (%)
    pub voice: bool,  // +v (+)
}

impl MemberModes {
    /// Owners, admins and ops count as channel operators. Halfops do not.
    pub fn is_operator(&self) -> bool {
        self.owner || self.admin || self.op
    }

    /// Apply a member mode letter. Returns false for letters that are not
    /// member modes.
    pub fn apply(&mut self, mode: char, adding: bool) -> bool {
        let slot = match mode {
            'q' => &mut self.owner,
            'a' => &mut self.admin,
            'o' => &mut self.op,
            'h' => &mut self.halfop,
            'v' => &mut self.voice,
            _ => return false,
        };
        *slot = adding;
        true
    }

    /// Split a NAMES entry such as `@+alice` into its modes and nickname.
    pub fn from_names_entry(entry: &str) -> (Self, &str) {
        let mut modes = Self::default();
        let nick = entry.trim_start_matches(|c: char| {
            let mode = match c {
                '~' => 'q',
                '&' => 'a',
                '@' => 'o',
                '%' => 'h',
                '+' => 'v',
                _ => return false,
            };
            modes.apply(mode, true)
        });
        (modes, nick)
    }
}

/// Immutable view of one channel's roster.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    channel: String,
    members: im::HashMap<String, MemberModes>,
}

impl RosterSnapshot {
    /// Whether `nick` currently holds operator status in `channel`.
    pub fn is_operator(&self, channel: &str, nick: &str) -> bool {
        irc_eq(channel, &self.channel)
            && self
                .members
                .get(&irc_to_lower(nick))
                .is_some_and(MemberModes::is_operator)
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.members.contains_key(&irc_to_lower(nick))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Live roster of the bot's channel.
#[derive(Debug)]
pub struct Membership {
    channel: String,
    members: RwLock<im::HashMap<String, MemberModes>>,
}

impl Membership {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            members: RwLock::new(im::HashMap::new()),
        }
    }

    /// Whether `name` is the tracked channel.
    pub fn tracks(&self, name: &str) -> bool {
        irc_eq(name, &self.channel)
    }

    /// O(1) copy of the current roster.
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            channel: self.channel.clone(),
            members: self.members.read().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Forget everyone (the bot left or is about to rejoin).
    pub fn clear(&self) {
        self.members.write().clear();
    }

    /// Merge one RPL_NAMREPLY line: space-separated, prefix-decorated nicks.
    pub fn add_names(&self, names: &str) {
        let mut members = self.members.write();
        for entry in names.split_whitespace() {
            let (modes, nick) = MemberModes::from_names_entry(entry);
            if !nick.is_empty() {
                members.insert(irc_to_lower(nick), modes);
            }
        }
    }

    pub fn join(&self, nick: &str) {
        self.members
            .write()
            .insert(irc_to_lower(nick), MemberModes::default());
    }

    /// Remove a member (PART, QUIT, KICK).
    pub fn remove(&self, nick: &str) {
        self.members.write().remove(&irc_to_lower(nick));
    }

    /// Carry a member's modes over a nick change.
    pub fn rename(&self, old: &str, new: &str) {
        let mut members = self.members.write();
        if let Some(modes) = members.remove(&irc_to_lower(old)) {
            members.insert(irc_to_lower(new), modes);
        }
    }

    /// Apply a channel MODE change.
    ///
    /// `args` are the mode arguments in order. Letters that take an argument
    /// consume one even when they are not member modes, so a `+bo mask nick`
    /// still lands the `o` on the right nick.
    pub fn apply_modes(&self, modestring: &str, args: &[String]) {
        let mut members = self.members.write();
        let mut args = args.iter();
        let mut adding = true;

        for c in modestring.chars() {
            match c {
                '+' => adding = true,
                '-' => adding = false,
                'q' | 'a' | 'o' | 'h' | 'v' => {
                    let Some(nick) = args.next() else { break };
                    if let Some(modes) = members.get_mut(&irc_to_lower(nick)) {
                        modes.apply(c, adding);
                    }
                }
                'b' | 'e' | 'I' | 'k' => {
                    args.next();
                }
                'l' | 'j' | 'f' | 'L' if adding => {
                    args.next();
                }
                _ => {}
            }
        }
    }
}
