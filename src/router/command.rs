//! Command parsing.
//!
//! A message is trimmed and tried against [`PATTERNS`] in order; the first
//! pattern that matches decides the command. Keywords match
//! case-insensitively. Each bare-keyword usage pattern sits after its full
//! form, so `.add` alone gets the usage text while `.add text` stores text.

/// Which usage text a bare keyword asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTopic {
    Help,
    Add,
    Info,
    Delete,
    Freeze,
    Unfreeze,
    Set,
}

impl UsageTopic {
    pub fn text(self) -> &'static str {
        match self {
            Self::Help => "Try '.info help'",
            Self::Add => "Usage: '.add some info about yourself here'",
            Self::Info => "Usage: '.info username'",
            Self::Delete => "Mod only usage: '.delete username'",
            Self::Freeze => "Mod only usage: '.freeze username'",
            Self::Unfreeze => "Mod only usage: '.unfreeze username'",
            Self::Set => "Mod only usage: '.set username then some info about them'",
        }
    }
}

/// A parsed directory command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store info for the caller.
    Add { info: String },
    /// Look up someone's info.
    Info { name: String },
    Delete { name: String },
    Freeze { name: String },
    Unfreeze { name: String },
    /// Operator override of someone's info.
    Set { name: String, info: String },
    Usage(UsageTopic),
}

impl Command {
    /// Parse a chat message. `None` means the message is not for us.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        PATTERNS
            .iter()
            .find_map(|(keyword, shape)| shape.matches(strip_keyword(text, keyword)?))
    }

    /// Static label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Info { .. } => "info",
            Self::Delete { .. } => "delete",
            Self::Freeze { .. } => "freeze",
            Self::Unfreeze { .. } => "unfreeze",
            Self::Set { .. } => "set",
            Self::Usage(_) => "usage",
        }
    }
}

/// What must follow a keyword for a pattern to match.
enum Shape {
    /// `<text>`: the rest of the line after one space, kept verbatim.
    Text(fn(String) -> Command),
    /// `<name>`: the rest of the line after one space, trimmed.
    Name(fn(String) -> Command),
    /// `<token> <text>`: one whitespace-free token, one space, then the rest.
    TokenText(fn(String, String) -> Command),
    /// Nothing at all.
    Bare(UsageTopic),
}

impl Shape {
    fn matches(&self, rest: &str) -> Option<Command> {
        match self {
            Shape::Bare(topic) => rest.is_empty().then_some(Command::Usage(*topic)),
            Shape::Text(build) => {
                let text = argument(rest)?;
                Some(build(text.to_string()))
            }
            Shape::Name(build) => {
                let name = argument(rest)?.trim();
                (!name.is_empty()).then(|| build(name.to_string()))
            }
            Shape::TokenText(build) => {
                let (token, text) = argument(rest)?.split_once(' ')?;
                if token.is_empty() || token.contains(char::is_whitespace) || text.is_empty() {
                    return None;
                }
                Some(build(token.to_string(), text.to_string()))
            }
        }
    }
}

/// Priority-ordered pattern table. First match wins.
const PATTERNS: &[(&str, Shape)] = &[
    (".add", Shape::Text(|info| Command::Add { info })),
    (".info", Shape::Name(|name| Command::Info { name })),
    (".delete", Shape::Name(|name| Command::Delete { name })),
    (".freeze", Shape::Name(|name| Command::Freeze { name })),
    (".unfreeze", Shape::Name(|name| Command::Unfreeze { name })),
    (".set", Shape::TokenText(|name, info| Command::Set { name, info })),
    (".help", Shape::Bare(UsageTopic::Help)),
    (".add", Shape::Bare(UsageTopic::Add)),
    (".info", Shape::Bare(UsageTopic::Info)),
    (".delete", Shape::Bare(UsageTopic::Delete)),
    (".freeze", Shape::Bare(UsageTopic::Freeze)),
    (".unfreeze", Shape::Bare(UsageTopic::Unfreeze)),
    (".set", Shape::Bare(UsageTopic::Set)),
];

/// Case-insensitively strip `keyword` from the front of `text`.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &text[keyword.len()..])
}

/// The non-empty remainder after the single separating space.
fn argument(rest: &str) -> Option<&str> {
    rest.strip_prefix(' ').filter(|arg| !arg.is_empty())
}
