//! Protocol client lifecycle states.

/// Where a [`ProtocolClient`](super::ProtocolClient) is in its lifecycle.
///
/// ```text
/// Disconnected -> Connecting -> Authenticating -> Ready
///     Ready -> Joining -> Joined -> Parting -> Ready   (per channel)
///     Ready | Joined -> Quitting -> Closed
/// ```
///
/// Any state may drop straight to `Closed` when the connection is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    /// No transport yet.
    #[default]
    Disconnected,
    /// Transport open, registration not sent.
    Connecting,
    /// Registration sent, waiting for the first numeric reply.
    Authenticating,
    /// Registered; no channel joined.
    Ready,
    Joining,
    Joined,
    Parting,
    Quitting,
    /// Terminal.
    Closed,
}

impl ClientState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: ClientState) -> bool {
        use ClientState::*;

        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Authenticating)
                | (Authenticating, Ready)
                | (Ready, Joining)
                | (Joining, Joined)
                | (Joined, Parting)
                | (Parting, Ready)
                | (Ready | Joined, Quitting)
                | (_, Closed)
        )
    }

    /// Returns true once the client can no longer be used.
    pub fn is_terminal(self) -> bool {
        self == ClientState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::ClientState::*;
    use super::*;

    #[test]
    fn test_happy_path_is_legal() {
        let path = [
            Disconnected,
            Connecting,
            Authenticating,
            Ready,
            Joining,
            Joined,
            Parting,
            Ready,
            Quitting,
            Closed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_skipping_registration_is_illegal() {
        assert!(!Connecting.can_transition_to(Ready));
        assert!(!Authenticating.can_transition_to(Joining));
        assert!(!Joined.can_transition_to(Joining));
        assert!(!Closed.can_transition_to(Connecting));
    }

    #[test]
    fn test_abort_from_anywhere() {
        for state in [Connecting, Authenticating, Joined, Parting, Quitting] {
            assert!(state.can_transition_to(Closed));
        }
        assert!(Closed.is_terminal());
        assert!(!Ready.is_terminal());
    }
}
