//! Line framing for tokio.
//!
//! [`IrcCodec`] splits the byte stream on `\n`, decodes each line lossily as
//! UTF-8 (channels are full of Latin-1 clients) and parses it into a
//! [`Message`]. Oversized or malformed lines are discarded instead of
//! failing the stream, since a framed stream stops for good after its
//! first error.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::message::Message;

/// IRCv3 tag section (8191 bytes) plus the classic 512-byte body.
pub const MAX_LINE_LEN: usize = 8191 + 512;

/// Codec turning a byte stream into [`Message`]s and back.
#[derive(Debug)]
pub struct IrcCodec {
    /// Index of next byte to check for newline.
    next_index: usize,
    max_len: usize,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                continue;
            }

            // Blank and unparseable lines are dropped like oversized ones.
            if let Ok(msg) = String::from_utf8_lossy(&line).parse::<Message>() {
                return Ok(Some(msg));
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        let line = msg.to_string();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("PING :a\r\nPING :b\r\n");

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Message::new("PING", vec!["a".to_string()]))
        );
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().param(0), Some("b"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn waits_for_partial_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("PRIVMSG #c :hel");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"lo\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.param(1), Some("hello"));
    }

    #[test]
    fn skips_blank_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("\r\n\r\nPING x\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().command, "PING");
    }

    #[test]
    fn skips_malformed_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("@only=tags\r\n:prefix-only\r\nPING y\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.param(0), Some("y"));
    }

    #[test]
    fn discards_oversized_line_and_recovers() {
        let mut codec = IrcCodec::with_max_len(16);
        let mut buf = BytesMut::from("PRIVMSG #c :this is far too long");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b" still going\r\nPING ok\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert!(msg.is("PING"));
        assert_eq!(msg.param(0), Some("ok"));
    }

    #[test]
    fn replaces_invalid_utf8() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :caf\xe9\r\n"[..]);
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.param(1), Some("caf\u{fffd}"));
    }

    #[test]
    fn encodes_with_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Message::join("#chan"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"JOIN #chan\r\n");
    }
}
