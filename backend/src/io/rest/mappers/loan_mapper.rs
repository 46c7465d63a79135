use chrono::{DateTime, SecondsFormat, Utc};
use shared::{
    CreateLoanRequest, Installment, Loan, LoanData, LoanListData, LoanListResponse, LoanResponse,
    RecordPaymentRequest, ResponseStatus,
};

use crate::domain::commands::loan::CreateLoanCommand;
use crate::domain::commands::payment::RecordPaymentCommand;
use crate::domain::models::bank_file::BankFileUpload;
use crate::domain::models::loan::{DomainInstallment, DomainLoan};

pub struct LoanMapper;

impl LoanMapper {
    /// Timestamps go over the wire as RFC 3339 UTC with millisecond precision
    pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn installment_to_dto(domain: DomainInstallment) -> Installment {
        Installment {
            installment_number: domain.installment_number,
            due_date: Self::format_timestamp(domain.due_date),
            installment_amount: domain.installment_amount,
            remaining_balance: domain.remaining_balance,
            is_paid: domain.is_paid,
        }
    }

    /// Convert domain DomainLoan to shared Loan DTO
    pub fn to_dto(domain: DomainLoan) -> Loan {
        Loan {
            id: domain.id,
            customer_name: domain.customer_name,
            loan_amount: domain.loan_amount,
            remaining_amount: domain.remaining_amount,
            loan_duration: domain.loan_duration,
            bank_file: domain.bank_file,
            created_at: Self::format_timestamp(domain.created_at),
            repayment_schedule: domain
                .repayment_schedule
                .into_iter()
                .map(Self::installment_to_dto)
                .collect(),
        }
    }

    /// Convert Vec<DomainLoan> to Vec<Loan>
    pub fn to_dto_list(domain_loans: Vec<DomainLoan>) -> Vec<Loan> {
        domain_loans.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateLoanRequest, bank_file: BankFileUpload) -> CreateLoanCommand {
        CreateLoanCommand {
            customer_name: request.customer_name,
            loan_amount: request.loan_amount,
            loan_duration: request.loan_duration,
            bank_file,
        }
    }

    pub fn to_payment_command(
        loan_id: String,
        installment_number: u32,
        request: RecordPaymentRequest,
    ) -> RecordPaymentCommand {
        RecordPaymentCommand {
            loan_id,
            installment_number,
            paid_amount: request.paid_amount,
        }
    }

    pub fn to_loan_response(domain: DomainLoan, message: Option<String>) -> LoanResponse {
        LoanResponse {
            status: ResponseStatus::Success,
            message,
            data: LoanData {
                loan: Self::to_dto(domain),
            },
        }
    }

    pub fn to_loan_list_response(domain_loans: Vec<DomainLoan>) -> LoanListResponse {
        let loans = Self::to_dto_list(domain_loans);
        LoanListResponse {
            status: ResponseStatus::Success,
            results: loans.len(),
            data: LoanListData { loans },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn domain_loan() -> DomainLoan {
        let created_at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        DomainLoan {
            id: "loan-7".to_string(),
            customer_name: "Ada Lovelace".to_string(),
            loan_amount: dec!(200),
            remaining_amount: dec!(100),
            loan_duration: 2,
            bank_file: "bankfile-1-x.csv".to_string(),
            created_at,
            repayment_schedule: vec![
                DomainInstallment {
                    installment_number: 1,
                    due_date: Utc.with_ymd_and_hms(2025, 3, 3, 4, 5, 6).unwrap(),
                    installment_amount: dec!(100),
                    remaining_balance: dec!(100),
                    is_paid: true,
                },
                DomainInstallment {
                    installment_number: 2,
                    due_date: Utc.with_ymd_and_hms(2025, 4, 3, 4, 5, 6).unwrap(),
                    installment_amount: dec!(100),
                    remaining_balance: dec!(0),
                    is_paid: false,
                },
            ],
        }
    }

    #[test]
    fn test_to_dto() {
        let dto = LoanMapper::to_dto(domain_loan());

        assert_eq!(dto.id, "loan-7");
        assert_eq!(dto.created_at, "2025-02-03T04:05:06.000Z");
        assert_eq!(dto.repayment_schedule.len(), 2);
        assert_eq!(dto.repayment_schedule[0].due_date, "2025-03-03T04:05:06.000Z");
        assert!(dto.repayment_schedule[0].is_paid);
        assert_eq!(dto.repayment_schedule[1].remaining_balance, dec!(0));
    }

    #[test]
    fn test_list_response_counts_results() {
        let response = LoanMapper::to_loan_list_response(vec![domain_loan(), domain_loan()]);
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.results, 2);
        assert_eq!(response.data.loans.len(), 2);
    }

    #[test]
    fn test_loan_response_json_shape() {
        let response = LoanMapper::to_loan_response(domain_loan(), Some("done".to_string()));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"]["loan"]["remainingAmount"], 100.0);
        assert_eq!(json["data"]["loan"]["repaymentSchedule"][1]["installmentNumber"], 2);
    }
}
