//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// IRC Defaults
// =============================================================================

pub fn default_nick() -> String {
    "notify-bot".to_string()
}

/// The three-line build notification used when no template is configured.
pub fn default_template() -> Vec<String> {
    vec![
        "%{repository}#%{build_number} (%{branch} - %{commit} : %{author}): %{message}"
            .to_string(),
        "Change view : %{compare_url}".to_string(),
        "Build details : %{build_url}".to_string(),
    ]
}

// =============================================================================
// Timeout Defaults (seconds)
// =============================================================================

pub fn default_connect_timeout() -> u64 {
    10
}

pub fn default_io_timeout() -> u64 {
    10
}

pub fn default_handshake_timeout() -> u64 {
    30
}
