pub mod loan_mapper;

pub use loan_mapper::LoanMapper;
