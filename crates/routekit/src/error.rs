//! Error types for route operations.
//!
//! Every failure carries an [`ErrorCategory`] derived from the remote status
//! classification, independent of the transport that produced it. Each client
//! operation narrows which remote categories it surfaces verbatim; anything
//! else is reported as an unexpected error.

use std::fmt;

/// Result type alias for route operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of route errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or malformed input, caught before any network call.
    Validation,
    /// Remote app or route is absent.
    NotFound,
    /// Duplicate route on create.
    Conflict,
    /// Remote rejected the payload.
    BadRequest,
    /// Anything else, including transport failures.
    Unexpected,
}

impl ErrorCategory {
    /// Whether this category carries a structured message from the server.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::NotFound | Self::Conflict | Self::BadRequest)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid arguments",
            Self::NotFound => "App or route not found",
            Self::Conflict => "Route already exists",
            Self::BadRequest => "Request rejected by the server",
            Self::Unexpected => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Check the command arguments or the local func file",
            Self::NotFound => "Verify the app name and route path",
            Self::Conflict => "Use `routes update` to change an existing route",
            Self::BadRequest => "Check the route fields for invalid values",
            Self::Unexpected => "Check the API URL and that the server is reachable",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during route operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected locally.
    #[error("{0}")]
    Validation(String),

    /// The app or route does not exist.
    #[error("{message}")]
    NotFound {
        /// Message reported by the server.
        message: String,
    },

    /// The route already exists.
    #[error("{message}")]
    Conflict {
        /// Message reported by the server.
        message: String,
    },

    /// The server rejected the payload.
    #[error("{message}")]
    BadRequest {
        /// Message reported by the server.
        message: String,
    },

    /// Any other failure.
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Unexpected {
            message: message.into(),
            status,
        }
    }

    /// Classify a non-success HTTP status with the server's message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict { message },
            _ => Self::Unexpected {
                message,
                status: Some(status),
            },
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) => ErrorCategory::Validation,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::BadRequest { .. } => ErrorCategory::BadRequest,
            Error::Unexpected { .. } => ErrorCategory::Unexpected,
        }
    }

    /// Keep remote categories listed in `allowed`; demote every other remote
    /// error to [`Error::Unexpected`]. Validation errors pass through.
    #[must_use]
    pub fn surface_only(self, allowed: &[ErrorCategory]) -> Self {
        let category = self.category();
        if !category.is_remote() || allowed.contains(&category) {
            return self;
        }
        let status = match category {
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            _ => 400,
        };
        match self {
            Error::NotFound { message }
            | Error::Conflict { message }
            | Error::BadRequest { message } => Self::Unexpected {
                message,
                status: Some(status),
            },
            other => other,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::from_status(code, format!("HTTP {code}")),
            other => Self::Unexpected {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected {
            message: format!("invalid API response: {err}"),
            status: None,
        }
    }
}
