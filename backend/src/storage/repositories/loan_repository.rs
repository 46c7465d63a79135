//! # SQLite Loan Repository
//!
//! Persists a loan as one row in `loans` plus one row per installment in
//! `installments`. Reads always assemble the complete ordered schedule, so
//! callers only ever see whole loan documents.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info};

use crate::domain::models::loan::{apply_paid_amount, DomainInstallment, DomainLoan};
use crate::storage::connection::DbConnection;
use crate::storage::traits::{LoanStorage, PaymentOutcome};

const LOAN_COLUMNS: &str =
    "id, customer_name, loan_amount, remaining_amount, loan_duration, bank_file, created_at";
const INSTALLMENT_COLUMNS: &str =
    "loan_id, installment_number, due_date, installment_amount, remaining_balance, is_paid";

/// Repository for loan operations
#[derive(Clone)]
pub struct LoanRepository {
    db: DbConnection,
}

impl LoanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Load one loan and its schedule using an existing connection or transaction
    async fn fetch_loan(conn: &mut SqliteConnection, loan_id: &str) -> Result<Option<DomainLoan>> {
        let row = sqlx::query(&format!("SELECT {} FROM loans WHERE id = ?", LOAN_COLUMNS))
            .bind(loan_id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let installment_rows = sqlx::query(&format!(
            "SELECT {} FROM installments WHERE loan_id = ? ORDER BY installment_number ASC",
            INSTALLMENT_COLUMNS
        ))
        .bind(loan_id)
        .fetch_all(&mut *conn)
        .await?;

        let schedule = installment_rows
            .iter()
            .map(installment_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(loan_from_row(&row, schedule)?))
    }

    /// Work out why the conditional payment update touched no row
    async fn diagnose_unapplied_payment(
        conn: &mut SqliteConnection,
        loan_id: &str,
        installment_number: u32,
    ) -> Result<PaymentOutcome> {
        let loan_exists = sqlx::query("SELECT 1 FROM loans WHERE id = ?")
            .bind(loan_id)
            .fetch_optional(&mut *conn)
            .await?
            .is_some();
        if !loan_exists {
            return Ok(PaymentOutcome::LoanNotFound);
        }

        let is_paid: Option<bool> = sqlx::query_scalar(
            "SELECT is_paid FROM installments WHERE loan_id = ? AND installment_number = ?",
        )
        .bind(loan_id)
        .bind(i64::from(installment_number))
        .fetch_optional(&mut *conn)
        .await?;

        Ok(match is_paid {
            None => PaymentOutcome::InstallmentNotFound,
            Some(_) => PaymentOutcome::AlreadyPaid,
        })
    }
}

#[async_trait]
impl LoanStorage for LoanRepository {
    async fn store_loan(&self, loan: &DomainLoan) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loans (id, customer_name, loan_amount, remaining_amount, loan_duration, bank_file, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.customer_name)
        .bind(loan.loan_amount.to_string())
        .bind(loan.remaining_amount.to_string())
        .bind(i64::from(loan.loan_duration))
        .bind(&loan.bank_file)
        .bind(loan.created_at)
        .execute(&mut *tx)
        .await?;

        for installment in &loan.repayment_schedule {
            sqlx::query(
                r#"
                INSERT INTO installments (loan_id, installment_number, due_date, installment_amount, remaining_balance, is_paid)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&loan.id)
            .bind(i64::from(installment.installment_number))
            .bind(installment.due_date)
            .bind(installment.installment_amount.to_string())
            .bind(installment.remaining_balance.to_string())
            .bind(installment.is_paid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Stored loan {} with {} installments",
            loan.id,
            loan.repayment_schedule.len()
        );
        Ok(())
    }

    async fn get_loan(&self, loan_id: &str) -> Result<Option<DomainLoan>> {
        let mut conn = self.db.pool().acquire().await?;
        Self::fetch_loan(&mut conn, loan_id).await
    }

    async fn list_loans(&self) -> Result<Vec<DomainLoan>> {
        // Read both tables inside one transaction so the listing is a consistent snapshot
        let mut tx = self.db.pool().begin().await?;

        let loan_rows = sqlx::query(&format!(
            "SELECT {} FROM loans ORDER BY created_at ASC, id ASC",
            LOAN_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;

        let installment_rows = sqlx::query(&format!(
            "SELECT {} FROM installments ORDER BY loan_id ASC, installment_number ASC",
            INSTALLMENT_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut schedules: HashMap<String, Vec<DomainInstallment>> = HashMap::new();
        for row in &installment_rows {
            let loan_id: String = row.try_get("loan_id")?;
            schedules
                .entry(loan_id)
                .or_default()
                .push(installment_from_row(row)?);
        }

        let loans = loan_rows
            .iter()
            .map(|row| {
                let loan_id: String = row.try_get("id")?;
                let schedule = schedules.remove(&loan_id).unwrap_or_default();
                loan_from_row(row, schedule)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Listed {} loans", loans.len());
        Ok(loans)
    }

    async fn save_loan(&self, loan: &DomainLoan) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE loans
            SET customer_name = ?, remaining_amount = ?, bank_file = ?
            WHERE id = ?
            "#,
        )
        .bind(&loan.customer_name)
        .bind(loan.remaining_amount.to_string())
        .bind(&loan.bank_file)
        .bind(&loan.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(anyhow!("Cannot save loan {}: it does not exist", loan.id));
        }

        for installment in &loan.repayment_schedule {
            sqlx::query(
                r#"
                UPDATE installments
                SET is_paid = ?
                WHERE loan_id = ? AND installment_number = ?
                "#,
            )
            .bind(installment.is_paid)
            .bind(&loan.id)
            .bind(i64::from(installment.installment_number))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Saved loan {}", loan.id);
        Ok(())
    }

    async fn apply_installment_payment(
        &self,
        loan_id: &str,
        installment_number: u32,
        paid_amount: Decimal,
    ) -> Result<PaymentOutcome> {
        let mut tx = self.db.pool().begin().await?;

        // The write comes first so this transaction holds the write lock before
        // it reads the balance it is about to change.
        let flipped = sqlx::query(
            r#"
            UPDATE installments
            SET is_paid = 1
            WHERE loan_id = ? AND installment_number = ? AND is_paid = 0
            "#,
        )
        .bind(loan_id)
        .bind(i64::from(installment_number))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flipped == 0 {
            let outcome = Self::diagnose_unapplied_payment(&mut tx, loan_id, installment_number).await?;
            tx.rollback().await?;
            debug!(
                "Payment for loan {} installment {} not applied: {:?}",
                loan_id, installment_number, outcome
            );
            return Ok(outcome);
        }

        let stored: String = sqlx::query_scalar("SELECT remaining_amount FROM loans WHERE id = ?")
            .bind(loan_id)
            .fetch_one(&mut *tx)
            .await?;
        let balance = parse_money(&stored, "remaining_amount")?;
        let Ok(remaining) = apply_paid_amount(balance, paid_amount) else {
            tx.rollback().await?;
            debug!(
                "Payment of {} for loan {} installment {} overflows balance {}",
                paid_amount, loan_id, installment_number, balance
            );
            return Ok(PaymentOutcome::BalanceOutOfRange { remaining: balance });
        };

        sqlx::query("UPDATE loans SET remaining_amount = ? WHERE id = ?")
            .bind(remaining.to_string())
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        let loan = Self::fetch_loan(&mut tx, loan_id)
            .await?
            .ok_or_else(|| anyhow!("Loan {} disappeared while applying a payment", loan_id))?;

        tx.commit().await?;

        info!(
            "Applied payment of {} to loan {} installment {}; remaining {}",
            paid_amount, loan_id, installment_number, loan.remaining_amount
        );
        Ok(PaymentOutcome::Applied(loan))
    }
}

fn parse_money(raw: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("Invalid decimal in column {}: {:?}", column, raw))
}

fn loan_from_row(row: &SqliteRow, repayment_schedule: Vec<DomainInstallment>) -> Result<DomainLoan> {
    let loan_duration: i64 = row.try_get("loan_duration")?;

    Ok(DomainLoan {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        loan_amount: parse_money(&row.try_get::<String, _>("loan_amount")?, "loan_amount")?,
        remaining_amount: parse_money(
            &row.try_get::<String, _>("remaining_amount")?,
            "remaining_amount",
        )?,
        loan_duration: u32::try_from(loan_duration)
            .with_context(|| format!("Invalid loan duration: {}", loan_duration))?,
        bank_file: row.try_get("bank_file")?,
        created_at: row.try_get("created_at")?,
        repayment_schedule,
    })
}

fn installment_from_row(row: &SqliteRow) -> Result<DomainInstallment> {
    let installment_number: i64 = row.try_get("installment_number")?;

    Ok(DomainInstallment {
        installment_number: u32::try_from(installment_number)
            .with_context(|| format!("Invalid installment number: {}", installment_number))?,
        due_date: row.try_get("due_date")?,
        installment_amount: parse_money(
            &row.try_get::<String, _>("installment_amount")?,
            "installment_amount",
        )?,
        remaining_balance: parse_money(
            &row.try_get::<String, _>("remaining_balance")?,
            "remaining_balance",
        )?,
        is_paid: row.try_get("is_paid")?,
    })
}
