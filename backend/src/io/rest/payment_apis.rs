//! # REST API for Installment Payments

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::put,
    Router,
};
use shared::RecordPaymentRequest;
use tracing::info;

use crate::domain::errors::LoanServiceError;
use crate::io::rest::mappers::LoanMapper;
use crate::AppState;

/// Create a router for payment related APIs
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/:loan_id/repayments/:installment_number/pay",
        put(record_payment),
    )
}

/// Mark one installment paid and decrement the loan's remaining amount
pub async fn record_payment(
    State(state): State<AppState>,
    Path((loan_id, installment_number)): Path<(String, String)>,
    body: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Response {
    info!("PUT /api/v1/loans/{}/repayments/{}/pay", loan_id, installment_number);

    let installment_number = match installment_number.parse::<u32>() {
        Ok(number) => number,
        Err(_) => {
            return LoanServiceError::Validation(format!(
                "Installment number must be a non-negative integer (got {:?})",
                installment_number
            ))
            .into_response();
        }
    };

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return LoanServiceError::Validation(format!(
                "Request body must be JSON of the form {{\"paidAmount\": number}}: {}",
                rejection.body_text()
            ))
            .into_response();
        }
    };

    let command = LoanMapper::to_payment_command(loan_id, installment_number, request);

    match state.payment_service.record_payment(command).await {
        Ok(result) => {
            let response = LoanMapper::to_loan_response(result.loan, Some(result.success_message));
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
