//! # notify-proto
//!
//! The small slice of the IRC protocol a notification bot needs: typed
//! commands for the registration/join/speak/part/quit sequence, a parser for
//! the server lines a bot reacts to (`PING`, numerics, `ERROR`), a CRLF line
//! codec, and a TCP/TLS client transport.
//!
//! ```rust
//! use notify_proto::{Command, Message};
//!
//! let join = Message::from(Command::JOIN("#rust".to_string(), Some("key".to_string())));
//! assert_eq!(join.to_string(), "JOIN #rust key");
//!
//! let ping: Message = "PING :irc.example.com".parse().unwrap();
//! assert_eq!(ping.command, Command::PING("irc.example.com".to_string()));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod format;
pub mod irc;
pub mod line;
pub mod message;
pub mod transport;

pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::irc::IrcCodec;
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::transport::{
    IrcReader, IrcWriter, NotifyStream, TlsOptions, TransportError, MAX_IRC_LINE_LEN,
};
