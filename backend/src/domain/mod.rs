//! # Domain Module
//!
//! Business logic for loan servicing, independent of HTTP and of the storage
//! backend.
//!
//! - **schedule**: equal-split repayment schedule generation
//! - **loan_service**: loan creation from an application and its bank document,
//!   plus the read paths
//! - **payment_service**: the installment payment state transition
//! - **models**: domain entities and field validation
//! - **commands**: service inputs and outputs
//! - **errors**: the error taxonomy surfaced to callers

pub mod commands;
pub mod errors;
pub mod loan_service;
pub mod models;
pub mod payment_service;
pub mod schedule;

pub use errors::{LoanServiceError, LoanServiceResult};
pub use loan_service::LoanService;
pub use payment_service::{PaymentConsistency, PaymentService};
