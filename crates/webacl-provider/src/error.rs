//! Provider error types.
//!
//! Every provider operation reports failure through [`ProviderError`]; the
//! reconciler never inspects backend-specific error values.

use std::fmt;

/// Errors that can occur while talking to a WebACL backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The WebACL addressed by `arn` does not exist.
    #[error("WebACL not found: {arn}")]
    NotFound {
        /// ARN that was looked up.
        arn: String,
    },

    /// The lock token supplied with a mutation does not match the current version.
    #[error("Optimistic lock mismatch for {arn}: supplied lock token is stale")]
    OptimisticLock {
        /// ARN of the WebACL whose version moved on.
        arn: String,
    },

    /// A WebACL with the same name already exists in the backend.
    #[error("WebACL already exists: {name}")]
    AlreadyExists {
        /// Conflicting WebACL name.
        name: String,
    },

    /// The request built from the desired definition was rejected.
    #[error("Invalid WebACL request: {message}")]
    InvalidRequest {
        /// Backend diagnostic.
        message: String,
    },

    /// The backend could not be reached or refused service.
    #[error("WebACL backend unavailable: {message}")]
    Unavailable {
        /// Backend diagnostic.
        message: String,
    },
}

impl ProviderError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(arn: impl Into<String>) -> Self {
        Self::NotFound { arn: arn.into() }
    }

    /// Creates a new `OptimisticLock` error.
    #[must_use]
    pub fn optimistic_lock(arn: impl Into<String>) -> Self {
        Self::OptimisticLock { arn: arn.into() }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::OptimisticLock { .. } | Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
        }
    }
}

/// Categories of provider errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resource not found.
    NotFound,
    /// Lock token or name conflict.
    Conflict,
    /// Rejected request.
    Validation,
    /// Backend connectivity.
    Infrastructure,
    /// Failure inside the controller itself.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
