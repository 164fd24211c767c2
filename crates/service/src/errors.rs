use models::errors::ModelError;
use thiserror::Error;

/// Every failure a handler can observe. The HTTP layer maps each kind to one status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn already_present(entity: &str, id: i64) -> Self {
        Self::Conflict(format!("{} with id {} already present", entity, id))
    }

    pub fn internal(e: impl std::fmt::Display) -> Self { Self::Internal(e.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
        }
    }
}
