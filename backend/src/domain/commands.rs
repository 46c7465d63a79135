//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs from the `shared`
//! crate to these internal types.

pub mod loan {
    use rust_decimal::Decimal;

    use crate::domain::models::bank_file::BankFileUpload;
    use crate::domain::models::loan::DomainLoan;

    /// Input for creating a loan from an application and its bank document.
    #[derive(Debug, Clone)]
    pub struct CreateLoanCommand {
        pub customer_name: String,
        pub loan_amount: Decimal,
        pub loan_duration: u32,
        pub bank_file: BankFileUpload,
    }

    /// Input for reading a single loan.
    #[derive(Debug, Clone)]
    pub struct GetLoanCommand {
        pub loan_id: String,
    }

    /// Result of creating a loan.
    #[derive(Debug, Clone)]
    pub struct CreateLoanResult {
        pub loan: DomainLoan,
        pub success_message: String,
    }

    /// Result of listing loans.
    #[derive(Debug, Clone)]
    pub struct ListLoansResult {
        pub loans: Vec<DomainLoan>,
    }
}

pub mod payment {
    use rust_decimal::Decimal;

    use crate::domain::models::loan::DomainLoan;

    /// Input for paying one installment of a loan.
    #[derive(Debug, Clone)]
    pub struct RecordPaymentCommand {
        pub loan_id: String,
        pub installment_number: u32,
        pub paid_amount: Decimal,
    }

    /// Result of recording a payment.
    #[derive(Debug, Clone)]
    pub struct RecordPaymentResult {
        pub loan: DomainLoan,
        pub success_message: String,
    }
}
