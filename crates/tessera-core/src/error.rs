//! Unified error type for every Tessera crate.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Tessera.
///
/// Variants are grouped by the layer that raises them. The data-access layer
/// never translates one variant into another once raised; callers can match
/// on the variant they care about.
#[derive(Error, Debug)]
pub enum TesseraError {
    // ============ Lookup Errors ============
    /// No row matched a by-key operation.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// More than one row matched where at most one was expected.
    #[error("Ambiguous match for {resource_type}: {detail}")]
    AmbiguousMatch {
        resource_type: &'static str,
        detail: String,
    },

    /// Caller supplied an invalid argument (unknown column, bad filter).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Mapping Errors ============
    /// DTO and model could not be converted into one another.
    #[error("Mapping error: {0}")]
    Mapping(String),

    // ============ Infrastructure Errors ============
    /// The database could not be reached or the connection was lost.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed inside the database.
    #[error("Database error: {0}")]
    Database(String),

    /// Programming or deployment configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Mapping(_) => "MAPPING_ERROR",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates an ambiguous match error for a resource.
    #[must_use]
    pub fn ambiguous<T: Into<String>>(resource_type: &'static str, detail: T) -> Self {
        Self::AmbiguousMatch {
            resource_type,
            detail: detail.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a mapping error.
    #[must_use]
    pub fn mapping<T: Into<String>>(message: T) -> Self {
        Self::Mapping(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for the not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true when the database was unreachable rather than the
    /// statement being wrong.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Checks if this error is retriable.
    ///
    /// The data-access layer never retries on its own; this is a hint for
    /// callers that own a retry policy.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Database(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for TesseraError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err.to_string()),
            sqlx::Error::Configuration(_) => Self::Configuration(err.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::Encode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => Self::Mapping(err.to_string()),
            // Bind-parameter overflow lands here.
            sqlx::Error::Protocol(_) | sqlx::Error::InvalidArgument(_) => {
                Self::Internal(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().as_deref() == Some("23505") {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Mapping(format!("JSON serialization error: {}", err))
    }
}
