//! Error types for crgate

use thiserror::Error;

/// Main error type for crgate core operations
#[derive(Error, Debug)]
pub enum CrgateError {
    /// Configuration is missing a value or holds an invalid one
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Fixture data violates a catalog invariant
    #[error("Fixture error: {0}")]
    FixtureError(String),

    /// TOML document could not be parsed
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for crgate core operations
pub type Result<T> = std::result::Result<T, CrgateError>;

/// Failures of the two-step directory protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The service search matched no entry for the username
    #[error("no directory entry for {0}")]
    NotFound(String),

    /// The directory refused the user's re-bind
    #[error("bind rejected: {0}")]
    BindRejected(String),

    /// Connectivity, timeout, or protocol failure
    #[error("{0}")]
    Transport(String),
}

/// Reasons a login attempt does not produce an identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Username or password absent or empty
    #[error("Username and password are required")]
    MissingCredentials,

    /// Mock table lookup failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Directory search returned no entry
    #[error("User not found")]
    UserNotFound,

    /// Directory re-bind as the user failed
    #[error("Invalid LDAP credentials")]
    BindRejected,

    /// Directory could not be reached or answered with a protocol error
    #[error("LDAP error: {0}")]
    Directory(String),
}

impl From<DirectoryError> for AuthFailure {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) => AuthFailure::UserNotFound,
            DirectoryError::BindRejected(_) => AuthFailure::BindRejected,
            DirectoryError::Transport(msg) => AuthFailure::Directory(msg),
        }
    }
}
