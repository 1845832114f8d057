//! Error taxonomy for the admission gate.
//!
//! Every externally-facing operation returns [`Result<T>`], whose error side is
//! [`AdmissionError`]. The taxonomy is deliberately small: a transport binding
//! maps each kind to a wire-level status code (invalid-argument, internal,
//! cancelled) without needing to inspect message strings.

use thiserror::Error;

/// Result type for admission-gate operations.
pub type Result<T> = std::result::Result<T, AdmissionError>;

/// Top-level error kind returned by [`crate::control::ControlApi`] operations.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The caller's request failed validation before any limiter or subnet
    /// list was consulted.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// A dependency (subnet store, etc.) failed. The request was not
    /// admitted and was not denied — the caller should retry.
    #[error("internal error: {0}")]
    Internal(String),

    /// The caller's cancellation token fired before the operation completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl AdmissionError {
    /// Wrap a lower-level error as an internal error with added context,
    /// mirroring how subnet-store failures are wrapped before leaving
    /// `check_auth`.
    pub fn internal(context: &str, source: impl std::fmt::Display) -> Self {
        Self::Internal(format!("{context}: {source}"))
    }
}

/// Validation failures produced at the service boundary, before any
/// `SubnetList` or `KeyedBucketStore` call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// `login` was empty.
    #[error("login must not be empty")]
    EmptyLogin,
    /// `password` was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// `ip` was empty.
    #[error("ip must not be empty")]
    EmptyIp,
    /// `ip` did not parse as an IPv4 or IPv6 literal.
    #[error("ip is not a valid address")]
    InvalidIp,
    /// A subnet argument did not parse as a CIDR prefix.
    #[error("subnet is not a valid CIDR prefix")]
    InvalidCidr,
}

/// Configuration errors, raised only during startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required fields were missing or failed validation.
    /// Carries every offending field, not just the first.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The config file or environment could not be read/parsed at all.
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),
}
