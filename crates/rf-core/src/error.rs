//! # AppError
//!
//! Centralized error handling for the Rusty-Forum ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifier that the storage layer cannot interpret (e.g., not a UUID)
    #[error("invalid {entity} id: {value}")]
    InvalidId { entity: &'static str, value: String },

    /// Well-formed identifier with no match (Thread, Answer, Comment, User)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Contract violation by the caller (e.g., vote value outside {-1, 0, 1})
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Kind token outside the closed set. A programming error, not user input.
    #[error("unknown thread kind: {0}")]
    UnknownKind(String),

    /// The stored document moved on since it was loaded
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, corrupt document)
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_id(entity: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId { entity, value: value.into() }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Expected failures that leave no state change behind and are safe to
    /// surface to the caller verbatim.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidId { .. } | Self::NotFound { .. } | Self::InvalidArgument(_) | Self::Conflict(_)
        )
    }
}

/// A specialized Result type for Rusty-Forum logic.
pub type Result<T> = std::result::Result<T, AppError>;
