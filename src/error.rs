//! Error types for cluster resource operations.
//!
//! Every variant's `Display` is the message shown to the user, so callers
//! print errors as-is.

use thiserror::Error;

/// Exit code reported when the user interrupts a running command.
pub const EXIT_CANCELLED: i32 = 130;

/// Main error type for rosa operations
#[derive(Error, Debug)]
pub enum RosaError {
    /// Bad option value, from a flag or after exhausting prompt attempts
    #[error("{0}")]
    Validation(String),

    /// Cluster is not in the ready state
    #[error("Cluster '{0}' is not yet ready")]
    NotReady(String),

    /// Operation requires a hosted control plane cluster
    #[error("{0} is only supported for Hosted Control Planes")]
    NotHostedControlPlane(String),

    /// External authentication is disabled on the cluster
    #[error(
        "External authentication configuration is not enabled for cluster '{0}'\n\
         Create a hosted control plane with '--external-auth-providers-enabled' parameter to enabled the configuration"
    )]
    ExternalAuthNotEnabled(String),

    /// A named resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Break glass credential (id, cluster key) has been revoked
    #[error("Break glass credential '{0}' for cluster '{1}' has been revoked.")]
    Revoked(String, String),

    /// Requested version is not an available upgrade
    #[error("Expected a valid machine pool version: {0}\nValid versions: {1}")]
    UnknownVersion(String, String),

    /// Manual schedule resolves to an instant in the past
    #[error("Schedule '{0}' is in the past")]
    ScheduleInPast(String),

    /// Retryable remote failure (connection, 429, 5xx)
    #[error("transient error: {0}")]
    Transient(String),

    /// Poll deadline elapsed
    #[error("{0}")]
    Timeout(String),

    /// Interrupted by the user
    #[error("operation cancelled")]
    Cancelled,

    /// Non-retryable remote failure, message carried verbatim
    #[error("{0}")]
    Remote(String),

    /// Configuration file problem (source, reason)
    #[error("invalid config '{0}': {1}")]
    Config(String, String),

    /// Local file read failure (path, reason)
    #[error("failed to read '{0}': {1}")]
    Io(String, String),

    /// Terminal interaction failed
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl RosaError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RosaError::Cancelled => EXIT_CANCELLED,
            _ => 1,
        }
    }

    /// Whether a poll loop should try again after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, RosaError::Transient(_))
    }

    /// Prefix the message of a remote error with context, keeping its kind.
    pub fn context(self, prefix: impl std::fmt::Display) -> Self {
        match self {
            RosaError::Remote(msg) => RosaError::Remote(format!("{}: {}", prefix, msg)),
            RosaError::Transient(msg) => RosaError::Transient(format!("{}: {}", prefix, msg)),
            other => other,
        }
    }
}

/// Result type alias for rosa operations
pub type Result<T> = std::result::Result<T, RosaError>;
