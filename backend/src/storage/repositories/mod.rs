// Repository modules
pub mod loan_repository;

// Re-export repository types
pub use loan_repository::LoanRepository;
