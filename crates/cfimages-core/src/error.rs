//! Error types for Images API operations.
//!
//! Two failure conventions coexist in the client: identifier validation
//! errors are returned directly to the caller, while network and remote
//! failures are logged at the public operation boundary and converted to an
//! absent result. Both are expressed through this single error type.

use thiserror::Error;

/// Main error type for Images API operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The HTTP response carried a non-success status
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body did not match the expected envelope shape
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// The envelope reported `success: false` or carried no result
    #[error("API error {code}: {message}")]
    Api {
        /// Service error code (1000+ by convention, 0 when absent)
        code: u32,
        /// Human-readable error message
        message: String,
    },

    /// Input was not a well-formed UUID
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// Input was not a valid compact image identifier
    #[error("Invalid compact identifier: {0}")]
    InvalidCompactId(String),

    /// Custom identifier was empty
    #[error("Custom identifier must not be empty")]
    EmptyId,

    /// Custom identifier started or ended with a slash
    #[error("Custom identifier must not start or end with a slash")]
    BoundarySlash,

    /// Custom identifier matched the canonical UUID layout
    #[error("Custom identifier must not be a UUID")]
    UuidCollision,

    /// Custom identifier exceeded the 1024-character limit
    #[error("Custom identifier too long: {0} characters")]
    IdTooLong(usize),

    /// List page size fell outside the accepted range
    #[error("per_page must be between 10 and 10000, got {0}")]
    InvalidPerPage(u32),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Base URL could not be parsed
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Images API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT",
            Self::Schema(_) => "SCHEMA",
            Self::Api { .. } => "API",
            Self::InvalidUuid(_) => "INVALID_UUID",
            Self::InvalidCompactId(_) => "INVALID_COMPACT_ID",
            Self::EmptyId => "EMPTY_ID",
            Self::BoundarySlash => "BOUNDARY_SLASH",
            Self::UuidCollision => "UUID_COLLISION",
            Self::IdTooLong(_) => "ID_TOO_LONG",
            Self::InvalidPerPage(_) => "INVALID_PER_PAGE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true if this error indicates misuse of the client API rather
    /// than a remote or transport failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUuid(_)
                | Self::InvalidCompactId(_)
                | Self::EmptyId
                | Self::BoundarySlash
                | Self::UuidCollision
                | Self::IdTooLong(_)
                | Self::InvalidPerPage(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidCompactId(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}
