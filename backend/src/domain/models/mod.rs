pub mod bank_file;
pub mod loan;
