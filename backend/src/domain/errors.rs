//! Error taxonomy surfaced by the loan services.
//!
//! Every failure carries a distinguishing kind and a human-readable message.
//! Nothing here is retried or swallowed; the io layer maps each variant to a
//! status code.

use crate::domain::models::bank_file::UnsupportedBankFileType;
use crate::domain::models::loan::LoanValidationError;

#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    /// Input violates a field constraint; raised before anything is persisted
    #[error("{0}")]
    Validation(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Installment {installment_number} not found on loan {loan_id}")]
    InstallmentNotFound { loan_id: String, installment_number: u32 },

    #[error("Installment {installment_number} is already paid")]
    AlreadyPaid { installment_number: u32 },

    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<LoanValidationError> for LoanServiceError {
    fn from(err: LoanValidationError) -> Self {
        LoanServiceError::Validation(err.to_string())
    }
}

impl From<UnsupportedBankFileType> for LoanServiceError {
    fn from(err: UnsupportedBankFileType) -> Self {
        LoanServiceError::Validation(err.to_string())
    }
}

pub type LoanServiceResult<T> = Result<T, LoanServiceError>;
