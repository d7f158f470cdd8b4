//! Error types for namecheap-ddns.

use thiserror::Error;

/// Result type alias for namecheap-ddns.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// Run-level error types.
///
/// Per-host update failures are deliberately absent here: they are recorded
/// in the [`ReconciliationReport`](crate::report::ReconciliationReport) and
/// never abort a run.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Required configuration missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The WAN IP could not be discovered; the run was aborted.
    #[error("WAN IP unavailable: {0}")]
    WanIp(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest renders the failing URL into its message; the update URL
        // embeds the password, so it must not survive into logs or reports.
        DdnsError::Network(e.without_url().to_string())
    }
}

impl From<toml::de::Error> for DdnsError {
    fn from(e: toml::de::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for DdnsError {
    fn from(e: toml::ser::Error) -> Self {
        DdnsError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for DdnsError {
    fn from(e: serde_json::Error) -> Self {
        DdnsError::Serialization(e.to_string())
    }
}
