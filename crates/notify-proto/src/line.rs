//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines from the server and writes CRLF-terminated
//! lines to it.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error;

/// Line-based codec that handles newline-terminated messages.
///
/// Decoded lines have their `\r\n` (or bare `\n`) stripped. A line longer
/// than the limit is dropped and decoding carries on with the next one.
/// Bytes that are not valid UTF-8 are replaced rather than rejected: servers
/// in the wild still emit Latin-1 MOTDs, and a bot only cares about a
/// handful of commands.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Dropping the rest of an overlong line until its newline arrives.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec limited to 512-byte lines (RFC 1459).
    pub fn new() -> Self {
        Self::with_max_len(512)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "discarding overlong line");
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "discarding overlong line");
                continue;
            }

            let data = String::from_utf8_lossy(&line);
            return Ok(Some(data.trim_end_matches(['\r', '\n']).to_string()));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        let line = msg.trim_end_matches(['\r', '\n']);
        if line.len() + 2 > self.max_len {
            return Err(error::ProtocolError::MessageTooLong {
                actual: line.len() + 2,
                limit: self.max_len,
            });
        }
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
