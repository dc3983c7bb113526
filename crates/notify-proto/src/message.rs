//! IRC message type and line parser.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};

/// An owned IRC message.
///
/// Outgoing messages from a bot never carry a prefix; incoming server lines
/// usually do (`:irc.example.com 001 bot :Welcome`). IRCv3 tags on incoming
/// lines are accepted and dropped.
///
/// ```
/// use notify_proto::{Command, Message};
///
/// let msg: Message = ":irc.example.com 001 bot :Welcome".parse().unwrap();
/// assert!(msg.is_numeric());
/// assert_eq!(msg.prefix.as_deref(), Some("irc.example.com"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host` or a server name).
    pub prefix: Option<String>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Create a PRIVMSG message to a target with text.
    #[must_use]
    pub fn privmsg<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// Create a NOTICE message to a target with text.
    #[must_use]
    pub fn notice<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Command::NOTICE(target.into(), text.into()).into()
    }

    /// Returns true if this is a three-digit numeric server reply.
    pub fn is_numeric(&self) -> bool {
        matches!(self.command, Command::Response(..))
    }

    /// Render the message as a wire line without the CRLF terminator.
    ///
    /// Unlike `to_string()`, this reports unserializable parameters as an
    /// error instead of panicking.
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        use std::fmt::Write;
        let mut line = String::with_capacity(64);
        write!(line, "{}", self).map_err(|_| ProtocolError::InvalidParam {
            command: self.command.name(),
        })?;
        Ok(line)
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let mut rest = s.trim_end_matches(['\r', '\n']);
        if rest.trim().is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        if rest.starts_with('@') {
            rest = match rest.split_once(' ') {
                Some((_, after)) => after.trim_start_matches(' '),
                None => return Err(invalid(MessageParseError::UnterminatedTags)),
            };
        }

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => match stripped.split_once(' ') {
                Some((prefix, after)) => {
                    rest = after.trim_start_matches(' ');
                    Some(prefix.to_string())
                }
                None => return Err(invalid(MessageParseError::UnterminatedOrigin)),
            },
            None => None,
        };

        let (name, mut params) = match rest.split_once(' ') {
            Some((name, params)) => (name, params),
            None => (rest, ""),
        };

        let mut args = Vec::new();
        loop {
            params = params.trim_start_matches(' ');
            if params.is_empty() {
                break;
            }
            if let Some(trailing) = params.strip_prefix(':') {
                args.push(trailing.to_string());
                break;
            }
            match params.split_once(' ') {
                Some((arg, after)) => {
                    args.push(arg.to_string());
                    params = after;
                }
                None => {
                    args.push(params.to_string());
                    break;
                }
            }
        }

        let command = Command::new(name, args).map_err(invalid)?;
        Ok(Message { prefix, command })
    }
}
