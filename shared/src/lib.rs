use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer's loan together with its full repayment schedule.
///
/// This is the wire shape returned by every loan endpoint. Money is
/// serialized as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Opaque identifier assigned at creation (UUID v4)
    pub id: String,
    /// Customer name (2-50 characters)
    pub customer_name: String,
    /// Original principal, immutable after creation
    #[serde(with = "rust_decimal::serde::float")]
    pub loan_amount: Decimal,
    /// Principal left after applied payments
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining_amount: Decimal,
    /// Duration in months (1-120)
    pub loan_duration: u32,
    /// Reference to the stored bank document
    pub bank_file: String,
    /// Human-readable creation timestamp (RFC 3339)
    pub created_at: String,
    /// Installments ordered by installment number
    pub repayment_schedule: Vec<Installment>,
}

/// One scheduled repayment unit within a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    /// 1-based position within the schedule
    pub installment_number: u32,
    /// Due date (RFC 3339)
    pub due_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub installment_amount: Decimal,
    /// Projected principal left once this installment is paid
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining_balance: Decimal,
    pub is_paid: bool,
}

/// Text fields of the multipart loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub loan_amount: Decimal,
    pub loan_duration: u32,
}

/// Body of `PUT /api/v1/loans/:loan_id/repayments/:installment_number/pay`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
}

/// Outcome marker carried by every response envelope.
///
/// `Fail` is used for client errors (4xx), `Error` for server errors (5xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanData {
    pub loan: Loan,
}

/// Envelope for endpoints returning a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: LoanData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanListData {
    pub loans: Vec<Loan>,
}

/// Envelope for the loan listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanListResponse {
    pub status: ResponseStatus,
    pub results: usize,
    pub data: LoanListData,
}

/// Distinguishing kind of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    ConflictError,
    StorageError,
}

/// Envelope for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        Loan {
            id: "3f0c3c1e-9a34-4c8e-8a37-5d1b0f8f2a10".to_string(),
            customer_name: "Ada Lovelace".to_string(),
            loan_amount: dec!(1000),
            remaining_amount: dec!(1000),
            loan_duration: 2,
            bank_file: "bankfile-1718000000000-abc.pdf".to_string(),
            created_at: "2025-01-15T10:00:00+00:00".to_string(),
            repayment_schedule: vec![Installment {
                installment_number: 1,
                due_date: "2025-02-15T10:00:00+00:00".to_string(),
                installment_amount: dec!(500),
                remaining_balance: dec!(500),
                is_paid: false,
            }],
        }
    }

    #[test]
    fn test_loan_serializes_with_camel_case_keys_and_numeric_money() {
        let json = serde_json::to_value(sample_loan()).unwrap();

        assert_eq!(json["customerName"], "Ada Lovelace");
        assert_eq!(json["loanAmount"].as_f64(), Some(1000.0));
        assert_eq!(json["loanDuration"], 2);
        assert_eq!(json["repaymentSchedule"][0]["installmentNumber"], 1);
        assert_eq!(json["repaymentSchedule"][0]["isPaid"], false);
    }

    #[test]
    fn test_record_payment_request_accepts_integer_and_fractional_numbers() {
        let whole: RecordPaymentRequest = serde_json::from_str(r#"{"paidAmount": 500}"#).unwrap();
        assert_eq!(whole.paid_amount, dec!(500));

        let cents: RecordPaymentRequest = serde_json::from_str(r#"{"paidAmount": 333.34}"#).unwrap();
        assert_eq!(cents.paid_amount, dec!(333.34));
    }

    #[test]
    fn test_loan_response_omits_missing_message() {
        let response = LoanResponse {
            status: ResponseStatus::Success,
            message: None,
            data: LoanData { loan: sample_loan() },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["loan"]["bankFile"], "bankfile-1718000000000-abc.pdf");
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            status: ResponseStatus::Fail,
            kind: ErrorKind::ConflictError,
            message: "Installment is already paid".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "fail");
        assert_eq!(json["kind"], "ConflictError");
    }
}
