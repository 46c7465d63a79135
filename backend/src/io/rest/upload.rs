//! Multipart parsing for loan applications.
//!
//! The form carries `customerName`, `loanAmount` and `loanDuration` text fields
//! (`name`, `amount` and `duration` are accepted too) and one `file` part. The
//! file's content type is checked before its body is read.

use axum::extract::multipart::{Multipart, MultipartError};
use rust_decimal::Decimal;
use shared::CreateLoanRequest;
use std::str::FromStr;
use tracing::debug;

use crate::domain::errors::{LoanServiceError, LoanServiceResult};
use crate::domain::models::bank_file::{BankFileKind, BankFileUpload};

/// A parsed loan application: the text fields plus the unstored document
#[derive(Debug)]
pub struct LoanUpload {
    pub request: CreateLoanRequest,
    pub bank_file: BankFileUpload,
}

#[derive(Default)]
struct UploadFields {
    customer_name: Option<String>,
    loan_amount: Option<String>,
    loan_duration: Option<String>,
    bank_file: Option<BankFileUpload>,
}

fn malformed(err: MultipartError) -> LoanServiceError {
    LoanServiceError::Validation(format!("Malformed multipart body: {}", err.body_text()))
}

pub async fn parse_loan_upload(mut multipart: Multipart) -> LoanServiceResult<LoanUpload> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let content_type = field.content_type().unwrap_or("none").to_string();
                let kind = BankFileKind::from_content_type(&content_type)?;
                let contents = field.bytes().await.map_err(malformed)?;
                debug!("Received bank file part ({}, {} bytes)", content_type, contents.len());
                fields.bank_file = Some(BankFileUpload {
                    kind,
                    contents: contents.to_vec(),
                });
            }
            "customerName" | "name" => {
                fields.customer_name = Some(field.text().await.map_err(malformed)?);
            }
            "loanAmount" | "amount" => {
                fields.loan_amount = Some(field.text().await.map_err(malformed)?);
            }
            "loanDuration" | "duration" => {
                fields.loan_duration = Some(field.text().await.map_err(malformed)?);
            }
            other => {
                debug!("Ignoring unexpected multipart field '{}'", other);
            }
        }
    }

    fields.into_upload()
}

impl UploadFields {
    fn into_upload(self) -> LoanServiceResult<LoanUpload> {
        let customer_name = required(self.customer_name, "customerName")?;
        let loan_amount = parse_loan_amount(&required(self.loan_amount, "loanAmount")?)?;
        let loan_duration = parse_loan_duration(&required(self.loan_duration, "loanDuration")?)?;
        let bank_file = self.bank_file.ok_or_else(|| {
            LoanServiceError::Validation("A bank file (PDF or CSV) must be uploaded in the 'file' field".to_string())
        })?;

        Ok(LoanUpload {
            request: CreateLoanRequest {
                customer_name,
                loan_amount,
                loan_duration,
            },
            bank_file,
        })
    }
}

fn required(value: Option<String>, field: &str) -> LoanServiceResult<String> {
    value.ok_or_else(|| LoanServiceError::Validation(format!("{} is required", field)))
}

/// Accepts plain decimals and scientific notation such as `1e3`
fn parse_loan_amount(raw: &str) -> LoanServiceResult<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            LoanServiceError::Validation(format!("loanAmount must be a number (got {:?})", raw))
        })
}

fn parse_loan_duration(raw: &str) -> LoanServiceResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        LoanServiceError::Validation(format!(
            "loanDuration must be a whole number of months (got {:?})",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fields(name: &str, amount: &str, duration: &str) -> UploadFields {
        UploadFields {
            customer_name: Some(name.to_string()),
            loan_amount: Some(amount.to_string()),
            loan_duration: Some(duration.to_string()),
            bank_file: Some(BankFileUpload {
                kind: BankFileKind::Csv,
                contents: b"a,b".to_vec(),
            }),
        }
    }

    #[test]
    fn test_complete_fields_parse() {
        let upload = fields("Ada", " 1200.50 ", "12").into_upload().unwrap();

        assert_eq!(upload.request.customer_name, "Ada");
        assert_eq!(upload.request.loan_amount, dec!(1200.50));
        assert_eq!(upload.request.loan_duration, 12);
        assert_eq!(upload.bank_file.kind, BankFileKind::Csv);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut missing_name = fields("Ada", "100", "1");
        missing_name.customer_name = None;
        let err = missing_name.into_upload().unwrap_err();
        assert_eq!(err.to_string(), "customerName is required");

        let mut missing_file = fields("Ada", "100", "1");
        missing_file.bank_file = None;
        assert!(matches!(missing_file.into_upload(), Err(LoanServiceError::Validation(_))));
    }

    #[test]
    fn test_unparseable_numbers() {
        assert!(matches!(
            fields("Ada", "lots", "12").into_upload(),
            Err(LoanServiceError::Validation(ref m)) if m.starts_with("loanAmount")
        ));
        assert!(matches!(
            fields("Ada", "100", "1.5").into_upload(),
            Err(LoanServiceError::Validation(ref m)) if m.starts_with("loanDuration")
        ));
        assert!(fields("Ada", "100", "-3").into_upload().is_err());
    }

    #[test]
    fn test_loan_amount_accepts_scientific_notation() {
        assert_eq!(parse_loan_amount("1e3").unwrap(), dec!(1000));
        assert_eq!(parse_loan_amount(" 2.5e2 ").unwrap(), dec!(250));
        assert_eq!(parse_loan_amount("1250.75").unwrap(), dec!(1250.75));
        assert!(parse_loan_amount("1e").is_err());
    }
}
