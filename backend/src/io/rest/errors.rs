//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorKind, ErrorResponse, ResponseStatus};
use tracing::{error, warn};

use crate::domain::errors::LoanServiceError;

impl LoanServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoanServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            LoanServiceError::LoanNotFound(_) | LoanServiceError::InstallmentNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            LoanServiceError::AlreadyPaid { .. } => StatusCode::CONFLICT,
            LoanServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanServiceError::Validation(_) => ErrorKind::ValidationError,
            LoanServiceError::LoanNotFound(_) | LoanServiceError::InstallmentNotFound { .. } => {
                ErrorKind::NotFoundError
            }
            LoanServiceError::AlreadyPaid { .. } => ErrorKind::ConflictError,
            LoanServiceError::Storage(_) => ErrorKind::StorageError,
        }
    }
}

impl IntoResponse for LoanServiceError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let (status, message) = if status_code.is_server_error() {
            // Storage details stay in the log
            error!("Request failed: {:#}", self);
            (ResponseStatus::Error, "Something went wrong while accessing storage".to_string())
        } else {
            warn!("Request rejected ({}): {}", status_code, self);
            (ResponseStatus::Fail, self.to_string())
        };

        let body = ErrorResponse {
            status,
            kind: self.kind(),
            message,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn into_error_response(err: LoanServiceError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_are_fail() {
        let (status, body) = into_error_response(LoanServiceError::AlreadyPaid { installment_number: 2 }).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.status, ResponseStatus::Fail);
        assert_eq!(body.kind, ErrorKind::ConflictError);
        assert_eq!(body.message, "Installment 2 is already paid");

        let (status, body) = into_error_response(LoanServiceError::LoanNotFound("x".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.kind, ErrorKind::NotFoundError);

        let (status, body) = into_error_response(LoanServiceError::Validation("bad".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.kind, ErrorKind::ValidationError);
        assert_eq!(body.message, "bad");
    }

    #[tokio::test]
    async fn test_storage_errors_are_error_without_details() {
        let err = LoanServiceError::Storage(anyhow::anyhow!("database is locked"));
        let (status, body) = into_error_response(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, ResponseStatus::Error);
        assert_eq!(body.kind, ErrorKind::StorageError);
        assert!(!body.message.contains("locked"));
    }
}
