//! # Storage Traits
//!
//! Storage abstractions used by the domain layer. Services hold these as
//! trait objects so the SQLite repository and the disk file store can be
//! swapped for other backends (or test doubles) without touching domain code.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::models::loan::DomainLoan;

/// Outcome of applying a payment in a single storage operation
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Installment flipped to paid and balance decremented; carries the updated loan
    Applied(DomainLoan),
    LoanNotFound,
    InstallmentNotFound,
    AlreadyPaid,
    /// Nothing changed: the new remaining amount cannot be represented
    BalanceOutOfRange { remaining: Decimal },
}

/// Trait defining the interface for loan storage operations
#[async_trait]
pub trait LoanStorage: Send + Sync {
    /// Store a new loan together with its full repayment schedule.
    /// Either everything is written or nothing is.
    async fn store_loan(&self, loan: &DomainLoan) -> Result<()>;

    /// Retrieve a loan (with its ordered schedule) by ID
    async fn get_loan(&self, loan_id: &str) -> Result<Option<DomainLoan>>;

    /// List all loans ordered by creation time (oldest first)
    async fn list_loans(&self) -> Result<Vec<DomainLoan>>;

    /// Overwrite the mutable state of an existing loan: its remaining amount
    /// and the paid flag of each installment
    async fn save_loan(&self, loan: &DomainLoan) -> Result<()>;

    /// Mark an installment paid and decrement the loan's remaining amount in
    /// one atomic operation, only if the installment was not paid yet
    async fn apply_installment_payment(
        &self,
        loan_id: &str,
        installment_number: u32,
        paid_amount: Decimal,
    ) -> Result<PaymentOutcome>;
}

/// Trait defining the interface for bank document storage
#[async_trait]
pub trait BankFileStorage: Send + Sync {
    /// Persist a document and return the reference to store on the loan
    async fn store_bank_file(&self, contents: &[u8], extension: &str) -> Result<String>;

    /// Remove a previously stored document
    async fn remove_bank_file(&self, reference: &str) -> Result<()>;
}
