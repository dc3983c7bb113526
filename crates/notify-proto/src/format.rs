//! Control character rules for outgoing message text.
//!
//! Notification templates may carry mIRC formatting (bold, color, reset and
//! friends) and plain tabs, so those pass through untouched. NUL is the one
//! character refused before it reaches the socket.
//!
//! Reference: <https://modern.ircdocs.horse/formatting>

/// Returns true if a character may not appear in an outgoing line.
///
/// CR and LF are line delimiters and are handled by the codec, not here.
///
/// ```
/// use notify_proto::format::is_illegal_control_char;
///
/// assert!(is_illegal_control_char('\x00'));
/// assert!(!is_illegal_control_char('\t'));
/// assert!(!is_illegal_control_char('\x02')); // Bold
/// assert!(!is_illegal_control_char('\n'));
/// ```
#[inline]
pub fn is_illegal_control_char(ch: char) -> bool {
    ch == '\0'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_and_bell_are_text() {
        assert!(!is_illegal_control_char('\t'));
        assert!(!is_illegal_control_char('\x07'));
        assert!(!is_illegal_control_char('\x1b'));
    }

    #[test]
    fn test_formatting_codes_pass() {
        for code in ['\x02', '\x03', '\x0F', '\x16', '\x1D', '\x1F'] {
            assert!(!is_illegal_control_char(code));
        }
    }

    #[test]
    fn test_nul_is_refused() {
        assert!(is_illegal_control_char('\0'));
    }
}
