//! Equal-split repayment schedule generation.
//!
//! Principal is divided evenly across the loan duration with no interest
//! component. Amounts are kept in whole cents: every installment but the last
//! carries `loan_amount / loan_duration` truncated to cents, and the last
//! installment absorbs the remainder so the schedule always sums to the
//! principal exactly.
//!
//! Due dates are calendar months after the creation instant. A day-of-month
//! that does not exist in the target month clamps to that month's last day
//! (Jan 31 + 1 month = Feb 28/29).

use chrono::{DateTime, Months, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::models::loan::{DomainInstallment, LoanValidationError, MONEY_SCALE};

/// Base installment amount: principal over duration, truncated to cents
pub fn base_installment_amount(loan_amount: Decimal, loan_duration: u32) -> Decimal {
    (loan_amount / Decimal::from(loan_duration))
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero)
}

/// Due date of installment `installment_number`
pub fn due_date(
    created_at: DateTime<Utc>,
    installment_number: u32,
) -> Result<DateTime<Utc>, LoanValidationError> {
    created_at
        .checked_add_months(Months::new(installment_number))
        .ok_or(LoanValidationError::DueDateOutOfRange(installment_number))
}

/// Build the full ordered schedule for a loan created at `created_at`.
///
/// Inputs are expected to be validated already; a zero duration is still
/// rejected here since it would divide by zero.
pub fn generate_repayment_schedule(
    loan_amount: Decimal,
    loan_duration: u32,
    created_at: DateTime<Utc>,
) -> Result<Vec<DomainInstallment>, LoanValidationError> {
    if loan_duration == 0 {
        return Err(LoanValidationError::LoanDurationOutOfRange {
            min: 1,
            max: crate::domain::models::loan::MAX_LOAN_DURATION,
            actual: 0,
        });
    }

    let base = base_installment_amount(loan_amount, loan_duration);
    let last_amount = loan_amount - base * Decimal::from(loan_duration - 1);

    (1..=loan_duration)
        .map(|installment_number| {
            let is_last = installment_number == loan_duration;
            let (installment_amount, remaining_balance) = if is_last {
                (last_amount, Decimal::ZERO)
            } else {
                (base, loan_amount - base * Decimal::from(installment_number))
            };

            Ok(DomainInstallment {
                installment_number,
                due_date: due_date(created_at, installment_number)?,
                installment_amount,
                remaining_balance,
                is_paid: false,
            })
        })
        .collect()
}
