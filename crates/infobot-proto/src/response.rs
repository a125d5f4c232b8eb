//! Numeric replies the bot reacts to.
//!
//! Only the handful of RFC 2812 numerics that drive registration, channel
//! membership and join failures are named here. Everything else is left as a
//! raw command string on [`Message`](crate::Message).

#![allow(non_camel_case_types)]

/// IRC server numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Registration accepted
    RPL_WELCOME = 1,
    /// 353 - NAMES list entry
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES list
    RPL_ENDOFNAMES = 366,
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
    /// 471 - Cannot join channel (+l)
    ERR_CHANNELISFULL = 471,
    /// 473 - Cannot join channel (+i)
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Cannot join channel (+b)
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Cannot join channel (+k)
    ERR_BADCHANNELKEY = 475,
}

impl Response {
    /// Numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a known numeric.
    pub fn from_code(code: u16) -> Option<Response> {
        Some(match code {
            1 => Response::RPL_WELCOME,
            353 => Response::RPL_NAMREPLY,
            366 => Response::RPL_ENDOFNAMES,
            432 => Response::ERR_ERRONEUSNICKNAME,
            433 => Response::ERR_NICKNAMEINUSE,
            471 => Response::ERR_CHANNELISFULL,
            473 => Response::ERR_INVITEONLYCHAN,
            474 => Response::ERR_BANNEDFROMCHAN,
            475 => Response::ERR_BADCHANNELKEY,
            _ => return None,
        })
    }

    /// Parse a three-digit command token such as `"001"`.
    pub fn from_command(command: &str) -> Option<Response> {
        if command.len() != 3 || !command.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        command.parse().ok().and_then(Response::from_code)
    }

    /// Whether this numeric reports that a JOIN was refused.
    pub fn is_join_failure(&self) -> bool {
        matches!(
            self,
            Response::ERR_CHANNELISFULL
                | Response::ERR_INVITEONLYCHAN
                | Response::ERR_BANNEDFROMCHAN
                | Response::ERR_BADCHANNELKEY
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_command_requires_three_digits() {
        assert_eq!(Response::from_command("001"), Some(Response::RPL_WELCOME));
        assert_eq!(Response::from_command("433"), Some(Response::ERR_NICKNAMEINUSE));
        assert_eq!(Response::from_command("1"), None);
        assert_eq!(Response::from_command("PRIVMSG"), None);
        assert_eq!(Response::from_command("999"), None);
    }

    #[test]
    fn join_failures_are_classified() {
        assert!(Response::ERR_BANNEDFROMCHAN.is_join_failure());
        assert!(!Response::RPL_NAMREPLY.is_join_failure());
        assert_eq!(Response::RPL_NAMREPLY.code(), 353);
    }
}
