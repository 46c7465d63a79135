//! # Storage Module
//!
//! Persistence for loans and the bank documents uploaded with them.
//!
//! Domain services only see the traits in [`traits`]; the SQLite repository
//! and the on-disk document store are the production implementations.
//!
//! - **Loans**: SQLite via SQLx, one row per loan plus one row per installment
//! - **Bank files**: plain files in a configured directory, named
//!   `bankfile-<epoch millis>-<uuid>.<ext>`

pub mod bank_files;
pub mod connection;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use bank_files::DiskBankFileStore;
pub use connection::DbConnection;
pub use repositories::LoanRepository;
pub use traits::{BankFileStorage, LoanStorage, PaymentOutcome};
