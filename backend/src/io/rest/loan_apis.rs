//! # REST API for Loans
//!
//! Loan creation from a multipart application and the read endpoints.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::commands::loan::GetLoanCommand;
use crate::domain::errors::LoanServiceError;
use crate::io::rest::mappers::LoanMapper;
use crate::io::rest::upload::parse_loan_upload;
use crate::AppState;

/// Create a router for loan related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_loans))
        .route("/upload", post(upload_loan))
        .route("/:loan_id", get(get_loan))
}

/// Create a loan from a customer's application and bank document
pub async fn upload_loan(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    info!("POST /api/v1/loans/upload");

    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return LoanServiceError::Validation(rejection.body_text()).into_response();
        }
    };

    let upload = match parse_loan_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return e.into_response(),
    };

    let command = LoanMapper::to_create_command(upload.request, upload.bank_file);

    match state.loan_service.create_loan(command).await {
        Ok(result) => {
            info!("{}: {}", result.success_message, result.loan.id);
            let response = LoanMapper::to_loan_response(result.loan, None);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a single loan with its repayment schedule
pub async fn get_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
) -> Response {
    info!("GET /api/v1/loans/{}", loan_id);

    let command = GetLoanCommand { loan_id };

    match state.loan_service.get_loan(command).await {
        Ok(loan) => {
            let response = LoanMapper::to_loan_response(loan, None);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List all loans, oldest first
pub async fn list_loans(State(state): State<AppState>) -> Response {
    info!("GET /api/v1/loans");

    match state.loan_service.list_loans().await {
        Ok(result) => {
            let response = LoanMapper::to_loan_list_response(result.loans);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
