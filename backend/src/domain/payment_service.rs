//! Payment recording for loan installments.
//!
//! An installment moves `Unpaid -> Paid` exactly once. Recording a payment
//! flips the flag and decrements the loan's remaining amount by the paid
//! amount; the paid amount is not reconciled against the installment amount.
//!
//! Two consistency modes are available:
//!
//! - [`PaymentConsistency::Atomic`] applies the payment in a single storage
//!   operation guarded by the installment still being unpaid, so concurrent
//!   payments of one installment succeed exactly once.
//! - [`PaymentConsistency::Legacy`] reads the loan, mutates it in memory and
//!   saves it back. Concurrent payments can both pass the unpaid check and the
//!   later save wins.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::payment::{RecordPaymentCommand, RecordPaymentResult};
use crate::domain::errors::{LoanServiceError, LoanServiceResult};
use crate::domain::models::loan::{
    apply_paid_amount, validate_paid_amount, DomainLoan, LoanValidationError,
};
use crate::storage::traits::{LoanStorage, PaymentOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentConsistency {
    #[default]
    Atomic,
    Legacy,
}

impl fmt::Display for PaymentConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentConsistency::Atomic => write!(f, "atomic"),
            PaymentConsistency::Legacy => write!(f, "legacy"),
        }
    }
}

/// Service for recording installment payments
#[derive(Clone)]
pub struct PaymentService {
    loan_storage: Arc<dyn LoanStorage>,
    consistency: PaymentConsistency,
}

impl PaymentService {
    pub fn new(loan_storage: Arc<dyn LoanStorage>, consistency: PaymentConsistency) -> Self {
        Self {
            loan_storage,
            consistency,
        }
    }

    /// Pay one installment of a loan and return the updated loan
    pub async fn record_payment(
        &self,
        command: RecordPaymentCommand,
    ) -> LoanServiceResult<RecordPaymentResult> {
        info!(
            "Recording payment of {} for loan {} installment {} ({} mode)",
            command.paid_amount, command.loan_id, command.installment_number, self.consistency
        );

        validate_paid_amount(command.paid_amount)?;

        let loan = match self.consistency {
            PaymentConsistency::Atomic => self.record_atomic(&command).await?,
            PaymentConsistency::Legacy => self.record_legacy(&command).await?,
        };

        info!(
            "Installment {} of loan {} paid; remaining amount {}",
            command.installment_number, loan.id, loan.remaining_amount
        );

        Ok(RecordPaymentResult {
            loan,
            success_message: "Installment payment updated successfully".to_string(),
        })
    }

    async fn record_atomic(&self, command: &RecordPaymentCommand) -> LoanServiceResult<DomainLoan> {
        let outcome = self
            .loan_storage
            .apply_installment_payment(&command.loan_id, command.installment_number, command.paid_amount)
            .await?;

        match outcome {
            PaymentOutcome::Applied(loan) => Ok(loan),
            PaymentOutcome::LoanNotFound => Err(LoanServiceError::LoanNotFound(command.loan_id.clone())),
            PaymentOutcome::InstallmentNotFound => Err(self.installment_not_found(command)),
            PaymentOutcome::AlreadyPaid => Err(self.already_paid(command)),
            PaymentOutcome::BalanceOutOfRange { remaining } => {
                Err(LoanValidationError::RemainingAmountOutOfRange {
                    remaining,
                    paid: command.paid_amount,
                }
                .into())
            }
        }
    }

    async fn record_legacy(&self, command: &RecordPaymentCommand) -> LoanServiceResult<DomainLoan> {
        let mut loan = self
            .loan_storage
            .get_loan(&command.loan_id)
            .await?
            .ok_or_else(|| LoanServiceError::LoanNotFound(command.loan_id.clone()))?;

        let installment = loan
            .installment_mut(command.installment_number)
            .ok_or_else(|| self.installment_not_found(command))?;

        if installment.is_paid {
            return Err(self.already_paid(command));
        }

        installment.is_paid = true;
        loan.remaining_amount = apply_paid_amount(loan.remaining_amount, command.paid_amount)?;

        self.loan_storage.save_loan(&loan).await?;
        Ok(loan)
    }

    fn installment_not_found(&self, command: &RecordPaymentCommand) -> LoanServiceError {
        warn!(
            "Installment {} not found on loan {}",
            command.installment_number, command.loan_id
        );
        LoanServiceError::InstallmentNotFound {
            loan_id: command.loan_id.clone(),
            installment_number: command.installment_number,
        }
    }

    fn already_paid(&self, command: &RecordPaymentCommand) -> LoanServiceError {
        warn!(
            "Rejected payment for loan {}: installment {} already paid",
            command.loan_id, command.installment_number
        );
        LoanServiceError::AlreadyPaid {
            installment_number: command.installment_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::generate_repayment_schedule;
    use crate::storage::{DbConnection, LoanRepository};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const BOTH_MODES: [PaymentConsistency; 2] = [PaymentConsistency::Atomic, PaymentConsistency::Legacy];

    async fn create_test_service(consistency: PaymentConsistency) -> (PaymentService, Arc<LoanRepository>) {
        let db = DbConnection::in_memory().await.expect("Failed to init test DB");
        let repository = Arc::new(LoanRepository::new(db));
        let service = PaymentService::new(repository.clone(), consistency);
        (service, repository)
    }

    async fn store_loan(repository: &LoanRepository, loan_amount: Decimal, loan_duration: u32) -> DomainLoan {
        let created_at = Utc::now();
        let loan = DomainLoan {
            id: DomainLoan::generate_id(),
            customer_name: "Test Customer".to_string(),
            loan_amount,
            remaining_amount: loan_amount,
            loan_duration,
            bank_file: "bankfile-1-test.pdf".to_string(),
            created_at,
            repayment_schedule: generate_repayment_schedule(loan_amount, loan_duration, created_at).unwrap(),
        };
        repository.store_loan(&loan).await.expect("Failed to store loan");
        loan
    }

    fn pay(loan_id: &str, installment_number: u32, paid_amount: Decimal) -> RecordPaymentCommand {
        RecordPaymentCommand {
            loan_id: loan_id.to_string(),
            installment_number,
            paid_amount,
        }
    }

    #[tokio::test]
    async fn test_record_payment() {
        for mode in BOTH_MODES {
            let (service, repository) = create_test_service(mode).await;
            let loan = store_loan(&repository, dec!(5000), 10).await;

            let result = service
                .record_payment(pay(&loan.id, 3, dec!(500)))
                .await
                .expect("Payment failed");

            assert_eq!(result.success_message, "Installment payment updated successfully");
            assert_eq!(result.loan.remaining_amount, dec!(4500), "{} mode", mode);
            for installment in &result.loan.repayment_schedule {
                assert_eq!(installment.is_paid, installment.installment_number == 3);
            }

            let stored = repository.get_loan(&loan.id).await.unwrap().unwrap();
            assert_eq!(stored, result.loan);
        }
    }

    #[tokio::test]
    async fn test_paid_amount_is_not_reconciled() {
        let (service, repository) = create_test_service(PaymentConsistency::Atomic).await;
        let loan = store_loan(&repository, dec!(100), 1).await;

        let result = service.record_payment(pay(&loan.id, 1, dec!(250))).await.unwrap();

        assert_eq!(result.loan.remaining_amount, dec!(-150));
    }

    #[tokio::test]
    async fn test_second_payment_conflicts() {
        for mode in BOTH_MODES {
            let (service, repository) = create_test_service(mode).await;
            let loan = store_loan(&repository, dec!(5000), 10).await;

            service.record_payment(pay(&loan.id, 1, dec!(500))).await.unwrap();
            let second = service.record_payment(pay(&loan.id, 1, dec!(500))).await;

            assert!(
                matches!(second, Err(LoanServiceError::AlreadyPaid { installment_number: 1 })),
                "{} mode",
                mode
            );
            let stored = repository.get_loan(&loan.id).await.unwrap().unwrap();
            assert_eq!(stored.remaining_amount, dec!(4500));
        }
    }

    #[tokio::test]
    async fn test_missing_installment_and_loan() {
        for mode in BOTH_MODES {
            let (service, repository) = create_test_service(mode).await;
            let loan = store_loan(&repository, dec!(1200), 12).await;

            let missing_installment = service.record_payment(pay(&loan.id, 13, dec!(100))).await;
            assert!(matches!(
                missing_installment,
                Err(LoanServiceError::InstallmentNotFound { installment_number: 13, .. })
            ));

            let zero_installment = service.record_payment(pay(&loan.id, 0, dec!(100))).await;
            assert!(matches!(zero_installment, Err(LoanServiceError::InstallmentNotFound { .. })));

            let missing_loan = service.record_payment(pay("no-such-loan", 1, dec!(100))).await;
            assert!(matches!(missing_loan, Err(LoanServiceError::LoanNotFound(ref id)) if id == "no-such-loan"));

            assert_eq!(repository.get_loan(&loan.id).await.unwrap().unwrap(), loan);
        }
    }

    #[tokio::test]
    async fn test_invalid_paid_amount_is_rejected_first() {
        let (service, repository) = create_test_service(PaymentConsistency::Atomic).await;
        let loan = store_loan(&repository, dec!(1200), 12).await;

        for paid_amount in [Decimal::ZERO, dec!(-1), dec!(10.001)] {
            let result = service.record_payment(pay(&loan.id, 1, paid_amount)).await;
            assert!(matches!(result, Err(LoanServiceError::Validation(_))));
        }

        // Validation runs before the lookup, even for unknown loans
        let result = service.record_payment(pay("no-such-loan", 1, Decimal::ZERO)).await;
        assert!(matches!(result, Err(LoanServiceError::Validation(_))));

        assert_eq!(repository.get_loan(&loan.id).await.unwrap().unwrap(), loan);
    }

    #[tokio::test]
    async fn test_payment_overflowing_remaining_amount_is_rejected() {
        let huge = dec!(79000000000000000000000000000);
        for mode in BOTH_MODES {
            let (service, repository) = create_test_service(mode).await;
            let loan = store_loan(&repository, dec!(1200), 12).await;

            let first = service.record_payment(pay(&loan.id, 1, huge)).await.unwrap();
            assert_eq!(first.loan.remaining_amount, dec!(-78999999999999999999999998800));

            let second = service.record_payment(pay(&loan.id, 2, huge)).await;
            assert!(matches!(second, Err(LoanServiceError::Validation(_))), "{} mode", mode);

            let stored = repository.get_loan(&loan.id).await.unwrap().unwrap();
            assert_eq!(stored, first.loan);
        }
    }

    #[tokio::test]
    async fn test_concurrent_atomic_payments_succeed_once() {
        let (service, repository) = create_test_service(PaymentConsistency::Atomic).await;
        let loan = store_loan(&repository, dec!(1200), 12).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = service.clone();
                let loan_id = loan.id.clone();
                tokio::spawn(async move { service.record_payment(pay(&loan_id, 7, dec!(100))).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.expect("Task panicked") {
                Ok(_) => successes += 1,
                Err(LoanServiceError::AlreadyPaid { .. }) => conflicts += 1,
                Err(other) => panic!("Unexpected error: {}", other),
            }
        }

        assert_eq!((successes, conflicts), (1, 1));
        let stored = repository.get_loan(&loan.id).await.unwrap().unwrap();
        assert_eq!(stored.remaining_amount, dec!(1100));
    }

    #[test]
    fn test_consistency_defaults_to_atomic() {
        assert_eq!(PaymentConsistency::default(), PaymentConsistency::Atomic);
        assert_eq!(PaymentConsistency::Legacy.to_string(), "legacy");
    }
}
