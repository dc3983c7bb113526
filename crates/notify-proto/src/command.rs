//! IRC command types.
//!
//! Only the commands a notification bot sends or reacts to have typed
//! variants. Any other server line survives as [`Command::Raw`] so the reader
//! can log it without failing.
//!
//! # Reference
//! - RFC 1459 / RFC 2812: Internet Relay Chat: Client Protocol

use std::fmt::{self, Write};

use crate::error::MessageParseError;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // === Connection Registration ===
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username hostname servername :realname` (RFC 1459 form)
    USER(String, String, String, String),
    /// `QUIT [:message]`
    QUIT(Option<String>),

    // === Channel Operations ===
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel`
    PART(String),

    // === Messaging ===
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),

    // === Keep-alive ===
    /// `PING token`
    PING(String),
    /// `PONG token`
    PONG(String),

    // === Server replies ===
    /// `ERROR :reason`, sent by the server right before it closes the link.
    ERROR(String),
    /// A three-digit numeric reply with its parameters.
    Response(u16, Vec<String>),
    /// Any other command, kept verbatim.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a parsed command name and its parameters.
    pub fn new(name: &str, mut args: Vec<String>) -> Result<Command, MessageParseError> {
        if name.is_empty() {
            return Err(MessageParseError::InvalidCommand);
        }

        if let Some(code) = parse_numeric(name) {
            return Ok(Command::Response(code, args));
        }

        let require = |args: &Vec<String>, expected: usize| {
            if args.len() < expected {
                Err(MessageParseError::NotEnoughArguments {
                    expected,
                    got: args.len(),
                })
            } else {
                Ok(())
            }
        };

        let command = match name.to_ascii_uppercase().as_str() {
            "PASS" => {
                require(&args, 1)?;
                Command::PASS(args.swap_remove(0))
            }
            "NICK" => {
                require(&args, 1)?;
                Command::NICK(args.swap_remove(0))
            }
            "USER" => {
                require(&args, 4)?;
                let mut it = args.into_iter();
                Command::USER(
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                )
            }
            "QUIT" => Command::QUIT(args.into_iter().next()),
            "JOIN" => {
                require(&args, 1)?;
                let mut it = args.into_iter();
                let channel = it.next().unwrap_or_default();
                Command::JOIN(channel, it.next())
            }
            "PART" => {
                require(&args, 1)?;
                Command::PART(args.swap_remove(0))
            }
            "PRIVMSG" => {
                require(&args, 2)?;
                let text = args.swap_remove(1);
                Command::PRIVMSG(args.swap_remove(0), text)
            }
            "NOTICE" => {
                require(&args, 2)?;
                let text = args.swap_remove(1);
                Command::NOTICE(args.swap_remove(0), text)
            }
            "PING" => {
                require(&args, 1)?;
                Command::PING(args.swap_remove(0))
            }
            "PONG" => {
                require(&args, 1)?;
                Command::PONG(args.swap_remove(0))
            }
            "ERROR" => Command::ERROR(args.into_iter().next().unwrap_or_default()),
            _ => Command::Raw(name.to_string(), args),
        };

        Ok(command)
    }

    /// The wire name of the command (`"PRIVMSG"`, `"001"`, ...).
    pub fn name(&self) -> String {
        match self {
            Command::PASS(_) => "PASS".to_string(),
            Command::NICK(_) => "NICK".to_string(),
            Command::USER(..) => "USER".to_string(),
            Command::QUIT(_) => "QUIT".to_string(),
            Command::JOIN(..) => "JOIN".to_string(),
            Command::PART(_) => "PART".to_string(),
            Command::PRIVMSG(..) => "PRIVMSG".to_string(),
            Command::NOTICE(..) => "NOTICE".to_string(),
            Command::PING(_) => "PING".to_string(),
            Command::PONG(_) => "PONG".to_string(),
            Command::ERROR(_) => "ERROR".to_string(),
            Command::Response(code, _) => format!("{:03}", code),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// Parse a three-digit numeric reply code.
fn parse_numeric(name: &str) -> Option<u16> {
    if name.len() == 3 && name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}

/// Check if a string needs colon-prefixing as a trailing IRC argument.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Reject parameters that would split or truncate the line on the wire.
fn validate_param(param: &str) -> fmt::Result {
    if param.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err(fmt::Error);
    }
    Ok(())
}

/// Write a command whose last argument is colon-prefixed only when needed.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        validate_param(arg)?;
        f.write_char(' ')?;
        let is_last = i == args.len() - 1;
        if is_last && needs_colon_prefix(arg) {
            f.write_char(':')?;
        } else if !is_last && (arg.is_empty() || arg.contains(' ')) {
            return Err(fmt::Error);
        }
        f.write_str(arg)?;
    }
    Ok(())
}

/// Write a command whose last argument is always colon-prefixed (free text).
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((trailing, middle)) => {
            write_cmd(f, cmd, middle)?;
            validate_param(trailing)?;
            f.write_str(" :")?;
            f.write_str(trailing)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p]),
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, h, s, r) => write_cmd_freeform(f, "USER", &[u, h, s, r]),
            Command::QUIT(Some(m)) => write_cmd_freeform(f, "QUIT", &[m]),
            Command::QUIT(None) => write_cmd(f, "QUIT", &[]),
            Command::JOIN(c, Some(k)) => write_cmd(f, "JOIN", &[c, k]),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c) => write_cmd(f, "PART", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
            Command::PING(t) => write_cmd(f, "PING", &[t]),
            Command::PONG(t) => write_cmd(f, "PONG", &[t]),
            Command::ERROR(m) => write_cmd_freeform(f, "ERROR", &[m]),
            Command::Response(code, args) => {
                let code = format!("{:03}", code);
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd_freeform(f, &code, &args)
            }
            Command::Raw(name, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, name, &args)
            }
        }
    }
}
