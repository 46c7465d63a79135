//! Loan service domain logic.
//!
//! Turns a loan application plus its bank document into a persisted loan with
//! a full repayment schedule, and serves the read paths.
//!
//! ## Business Rules
//!
//! - Customer name 2-50 characters, amount 10 to 1,000,000 in whole cents,
//!   duration 1-120 months
//! - Only PDF and CSV bank documents are accepted
//! - All validation happens before anything is written
//! - A stored document is removed again if the loan itself cannot be stored

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::commands::loan::{
    CreateLoanCommand, CreateLoanResult, GetLoanCommand, ListLoansResult,
};
use crate::domain::errors::{LoanServiceError, LoanServiceResult};
use crate::domain::models::loan::{
    validate_bank_file, validate_customer_name, validate_loan_amount, validate_loan_duration,
    DomainLoan,
};
use crate::domain::schedule::generate_repayment_schedule;
use crate::storage::traits::{BankFileStorage, LoanStorage};

/// Service for creating and reading loans
#[derive(Clone)]
pub struct LoanService {
    loan_storage: Arc<dyn LoanStorage>,
    bank_file_storage: Arc<dyn BankFileStorage>,
}

impl LoanService {
    pub fn new(
        loan_storage: Arc<dyn LoanStorage>,
        bank_file_storage: Arc<dyn BankFileStorage>,
    ) -> Self {
        Self {
            loan_storage,
            bank_file_storage,
        }
    }

    /// Create a loan: store the bank document, generate the schedule, persist the loan
    pub async fn create_loan(&self, command: CreateLoanCommand) -> LoanServiceResult<CreateLoanResult> {
        info!(
            "Creating loan for '{}': amount={}, duration={} months, bank file {:?} ({} bytes)",
            command.customer_name,
            command.loan_amount,
            command.loan_duration,
            command.bank_file.kind,
            command.bank_file.contents.len()
        );

        validate_customer_name(&command.customer_name)?;
        validate_loan_amount(command.loan_amount)?;
        validate_loan_duration(command.loan_duration)?;

        let bank_file = self
            .bank_file_storage
            .store_bank_file(&command.bank_file.contents, command.bank_file.kind.extension())
            .await?;

        match self.build_and_store_loan(&command, &bank_file).await {
            Ok(loan) => {
                info!(
                    "Created loan {} with {} installments",
                    loan.id,
                    loan.repayment_schedule.len()
                );
                Ok(CreateLoanResult {
                    loan,
                    success_message: "Loan created successfully".to_string(),
                })
            }
            Err(err) => {
                warn!("Loan creation failed, removing bank file {}: {}", bank_file, err);
                if let Err(cleanup_err) = self.bank_file_storage.remove_bank_file(&bank_file).await {
                    error!("Failed to remove orphaned bank file {}: {}", bank_file, cleanup_err);
                }
                Err(err)
            }
        }
    }

    async fn build_and_store_loan(
        &self,
        command: &CreateLoanCommand,
        bank_file: &str,
    ) -> LoanServiceResult<DomainLoan> {
        validate_bank_file(bank_file)?;

        let created_at = Utc::now();
        let repayment_schedule =
            generate_repayment_schedule(command.loan_amount, command.loan_duration, created_at)?;

        let loan = DomainLoan {
            id: DomainLoan::generate_id(),
            customer_name: command.customer_name.trim().to_string(),
            loan_amount: command.loan_amount,
            remaining_amount: command.loan_amount,
            loan_duration: command.loan_duration,
            bank_file: bank_file.to_string(),
            created_at,
            repayment_schedule,
        };

        self.loan_storage.store_loan(&loan).await?;
        Ok(loan)
    }

    pub async fn get_loan(&self, command: GetLoanCommand) -> LoanServiceResult<DomainLoan> {
        info!("Getting loan {}", command.loan_id);

        let loan = self.loan_storage.get_loan(&command.loan_id).await?;
        loan.ok_or(LoanServiceError::LoanNotFound(command.loan_id))
    }

    pub async fn list_loans(&self) -> LoanServiceResult<ListLoansResult> {
        let loans = self.loan_storage.list_loans().await?;
        info!("Listing {} loans", loans.len());
        Ok(ListLoansResult { loans })
    }
}
