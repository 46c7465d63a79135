use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub const MIN_CUSTOMER_NAME_LENGTH: usize = 2;
pub const MAX_CUSTOMER_NAME_LENGTH: usize = 50;
pub const MIN_LOAN_AMOUNT: Decimal = dec!(10);
pub const MAX_LOAN_AMOUNT: Decimal = dec!(1000000);
pub const MIN_LOAN_DURATION: u32 = 1;
pub const MAX_LOAN_DURATION: u32 = 120;
pub const MAX_BANK_FILE_LENGTH: usize = 255;

/// Decimal places carried by every money amount (cents)
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct DomainLoan {
    pub id: String,
    pub customer_name: String,
    pub loan_amount: Decimal,
    pub remaining_amount: Decimal,
    pub loan_duration: u32,
    pub bank_file: String,
    pub created_at: DateTime<Utc>,
    pub repayment_schedule: Vec<DomainInstallment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainInstallment {
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    pub installment_amount: Decimal,
    pub remaining_balance: Decimal,
    pub is_paid: bool,
}

impl DomainLoan {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Find an installment by its number (linear scan over the ordered schedule)
    pub fn installment_mut(&mut self, installment_number: u32) -> Option<&mut DomainInstallment> {
        self.repayment_schedule
            .iter_mut()
            .find(|installment| installment.installment_number == installment_number)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanValidationError {
    #[error("Customer name must be between {min} and {max} characters (got {actual})")]
    CustomerNameLength { min: usize, max: usize, actual: usize },
    #[error("Loan amount must be between {min} and {max} (got {actual})")]
    LoanAmountOutOfRange { min: Decimal, max: Decimal, actual: Decimal },
    #[error("Loan amount cannot have more than 2 decimal places (got {0})")]
    LoanAmountPrecision(Decimal),
    #[error("Loan duration must be between {min} and {max} months (got {actual})")]
    LoanDurationOutOfRange { min: u32, max: u32, actual: u32 },
    #[error("Bank file reference cannot be empty")]
    EmptyBankFile,
    #[error("Bank file reference cannot exceed {max} characters (got {actual})")]
    BankFileTooLong { max: usize, actual: usize },
    #[error("Paid amount must be positive (got {0})")]
    NonPositivePaidAmount(Decimal),
    #[error("Paid amount cannot have more than 2 decimal places (got {0})")]
    PaidAmountPrecision(Decimal),
    #[error("Paying {paid} would take the remaining amount {remaining} out of range")]
    RemainingAmountOutOfRange { remaining: Decimal, paid: Decimal },
    #[error("Due date for installment {0} is out of range")]
    DueDateOutOfRange(u32),
}

/// True when `amount` is representable in whole cents
pub fn has_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

pub fn validate_customer_name(customer_name: &str) -> Result<(), LoanValidationError> {
    let length = customer_name.trim().chars().count();
    if !(MIN_CUSTOMER_NAME_LENGTH..=MAX_CUSTOMER_NAME_LENGTH).contains(&length) {
        return Err(LoanValidationError::CustomerNameLength {
            min: MIN_CUSTOMER_NAME_LENGTH,
            max: MAX_CUSTOMER_NAME_LENGTH,
            actual: length,
        });
    }
    Ok(())
}

pub fn validate_loan_amount(loan_amount: Decimal) -> Result<(), LoanValidationError> {
    if loan_amount < MIN_LOAN_AMOUNT || loan_amount > MAX_LOAN_AMOUNT {
        return Err(LoanValidationError::LoanAmountOutOfRange {
            min: MIN_LOAN_AMOUNT,
            max: MAX_LOAN_AMOUNT,
            actual: loan_amount,
        });
    }
    if !has_money_scale(loan_amount) {
        return Err(LoanValidationError::LoanAmountPrecision(loan_amount));
    }
    Ok(())
}

pub fn validate_loan_duration(loan_duration: u32) -> Result<(), LoanValidationError> {
    if !(MIN_LOAN_DURATION..=MAX_LOAN_DURATION).contains(&loan_duration) {
        return Err(LoanValidationError::LoanDurationOutOfRange {
            min: MIN_LOAN_DURATION,
            max: MAX_LOAN_DURATION,
            actual: loan_duration,
        });
    }
    Ok(())
}

pub fn validate_bank_file(bank_file: &str) -> Result<(), LoanValidationError> {
    if bank_file.trim().is_empty() {
        return Err(LoanValidationError::EmptyBankFile);
    }
    let length = bank_file.chars().count();
    if length > MAX_BANK_FILE_LENGTH {
        return Err(LoanValidationError::BankFileTooLong {
            max: MAX_BANK_FILE_LENGTH,
            actual: length,
        });
    }
    Ok(())
}

/// Remaining amount after a payment; rejects results a decimal cannot hold
pub fn apply_paid_amount(remaining: Decimal, paid: Decimal) -> Result<Decimal, LoanValidationError> {
    remaining
        .checked_sub(paid)
        .ok_or(LoanValidationError::RemainingAmountOutOfRange { remaining, paid })
}

pub fn validate_paid_amount(paid_amount: Decimal) -> Result<(), LoanValidationError> {
    if paid_amount <= Decimal::ZERO {
        return Err(LoanValidationError::NonPositivePaidAmount(paid_amount));
    }
    if !has_money_scale(paid_amount) {
        return Err(LoanValidationError::PaidAmountPrecision(paid_amount));
    }
    Ok(())
}
