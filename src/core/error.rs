// Centralized error types for the navigation shell

use thiserror::Error;

/// Errors raised while building or driving the route table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors surfaced by the authentication session
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No active session")]
    NotAuthenticated,

    #[error("Session token was rejected by the backend")]
    Unauthorized,

    #[error("Profile endpoint returned error status: {0}")]
    Status(u16),

    #[error("Failed to reach profile endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed profile response: {0}")]
    Decode(String),

    #[error("Session changed while the profile was being refreshed")]
    SessionChanged,
}

/// Errors raised while waiting for a component to become ready
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("Component not ready after {waited_ms}ms")]
    TimedOut { waited_ms: u64 },

    #[error("Component was dropped before signalling readiness")]
    Abandoned,
}
