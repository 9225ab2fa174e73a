use thiserror::Error;
use uuid::Uuid;

use crate::domain::validator::ValidationErrors;

/// Message shown to clients for every internal failure.
pub const GENERIC_FAILURE: &str = "Something went wrong, try later...";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Failed to convert request data: {message}")]
    Mapping { message: String },

    #[error("Subscription not found: {id}")]
    NotFound { id: Uuid },

    #[error("Nothing to update for subscription {id}")]
    EmptyUpdate { id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }

    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn empty_update(id: Uuid) -> Self {
        Self::EmptyUpdate { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Failures caused by the server rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Mapping { .. } | Self::Database { .. })
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(e: ValidationErrors) -> Self {
        Self::validation(e.into_inner())
    }
}
