use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Failure of a record service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("employee {0} not found")]
    NotFound(Uuid),

    /// Document store read or write failed.
    #[error("document store error: {0:#}")]
    Persistence(anyhow::Error),

    /// File store write failed.
    #[error("file store error: {0:#}")]
    Storage(anyhow::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// Every failure is reported as a bare 500; the cause only goes to the log.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_500() {
        let errors = [
            ServiceError::NotFound(Uuid::new_v4()),
            ServiceError::Persistence(anyhow::anyhow!("db down")),
            ServiceError::Storage(anyhow::anyhow!("disk full")),
            ServiceError::invalid("joiningDate is required"),
        ];
        for err in errors {
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn display_carries_context() {
        let id = Uuid::nil();
        assert_eq!(
            ServiceError::NotFound(id).to_string(),
            format!("employee {id} not found")
        );
        let err = ServiceError::Storage(anyhow::anyhow!("inner").context("write uploads/x.png"));
        assert!(err.to_string().contains("write uploads/x.png"));
        assert!(err.to_string().contains("inner"));
    }
}
