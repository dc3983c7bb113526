//! IRC message codec for tokio.
//!
//! Encodes and decodes [`Message`] values on top of [`LineCodec`].

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
///
/// Wraps [`LineCodec`] and parses lines into [`Message`] types. A decode
/// error ends a `FramedRead` stream, so long-lived readers that must survive
/// odd server lines should frame with [`LineCodec`] and parse per line.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec limited to 512-byte lines.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Sanitize outgoing message data.
    ///
    /// Truncates at the first line ending and rejects NUL.
    pub fn sanitize(mut data: String) -> error::Result<String> {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }

        for ch in data.chars() {
            if crate::format::is_illegal_control_char(ch) {
                return Err(error::ProtocolError::IllegalControlChar(ch));
            }
        }

        Ok(data)
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        self.inner
            .decode(src)
            .and_then(|res| res.map_or(Ok(None), |line| line.parse::<Message>().map(Some)))
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_line()?)?;
        self.inner.encode(sanitized, dst)
    }
}
