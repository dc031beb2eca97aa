use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{LedgerEntry, Money, TransactionKind},
    fo_api::{
        errors::LedgerError,
        ledger::{self, LedgerAudit},
    },
    traits::{FoodOrderDatabase, LedgerStore, Page, Pagination, StorageError, UnitOfWork},
};

/// The smallest amount a customer may top up their balance by
pub const MIN_TOP_UP: Money = Money::from_major(1_000);

/// `LedgerApi` gives read access to customers' balance ledgers, and lets customers top up their balance.
///
/// Debits are never made through this API. The only debits are the ones made when an order is placed.
pub struct LedgerApi<B> {
    db: B,
}

impl<B> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi")
    }
}

impl<B> LedgerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

fn read_error(e: StorageError) -> LedgerError {
    LedgerError::LedgerReadError(e.to_string())
}

fn write_error(e: StorageError) -> LedgerError {
    LedgerError::LedgerWriteError(e.to_string())
}

impl<B> LedgerApi<B>
where B: FoodOrderDatabase
{
    /// Credits the customer's balance. The amount must be at least [`MIN_TOP_UP`].
    pub async fn top_up(
        &self,
        customer_id: &str,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount < MIN_TOP_UP {
            return Err(LedgerError::BelowMinimumTopUp { amount, minimum: MIN_TOP_UP });
        }
        let mut tx = self.db.begin().await.map_err(write_error)?;
        tx.lock_customer(customer_id).await.map_err(write_error)?;
        let entry =
            ledger::append_transaction(&mut tx, customer_id, TransactionKind::Credit, amount, description).await?;
        tx.commit().await.map_err(write_error)?;
        info!("💰️ {customer_id} topped up {amount}. Balance is now {}", entry.balance);
        Ok(entry)
    }

    /// The customer's current balance.
    pub async fn balance(&self, customer_id: &str) -> Result<Money, LedgerError> {
        let mut tx = self.db.begin().await.map_err(read_error)?;
        let balance = ledger::current_balance(&mut tx, customer_id).await?;
        tx.commit().await.map_err(read_error)?;
        Ok(balance)
    }

    /// The customer's ledger entries, oldest first.
    pub async fn history(&self, customer_id: &str, page: Pagination) -> Result<Page<LedgerEntry>, LedgerError> {
        let mut tx = self.db.begin().await.map_err(read_error)?;
        let total_rows = tx.count_ledger_entries(customer_id).await.map_err(read_error)?;
        let entries = tx.ledger_entries(customer_id, Some(page)).await.map_err(read_error)?;
        tx.commit().await.map_err(read_error)?;
        Ok(Page::new(entries, page.paging(total_rows)))
    }

    /// Replays the customer's whole ledger and checks every recorded balance.
    pub async fn audit(&self, customer_id: &str) -> Result<LedgerAudit, LedgerError> {
        let mut tx = self.db.begin().await.map_err(read_error)?;
        let entries = tx.ledger_entries(customer_id, None).await.map_err(read_error)?;
        tx.commit().await.map_err(read_error)?;
        let report = ledger::audit(customer_id, &entries);
        if report.is_consistent() {
            debug!("💰️ Ledger for {customer_id} is consistent over {} entries", report.entries);
        } else {
            warn!("💰️ Ledger for {customer_id} has {} inconsistent entries", report.discrepancies.len());
        }
        Ok(report)
    }
}
