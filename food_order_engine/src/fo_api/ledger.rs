//! The balance ledger.
//!
//! A customer's balance is never stored as a mutable counter. Each ledger entry records the balance that resulted
//! from applying it, and the current balance is the `balance` of the newest entry. Because the log is append-only, the
//! same value can always be recomputed by folding over the entries from an opening balance of zero (see [`replay`]).
use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{LedgerEntry, Money, NewLedgerEntry, TransactionKind},
    fo_api::errors::LedgerError,
    traits::LedgerStore,
};

/// The customer's current balance. Customers with no ledger entries have a balance of zero.
pub async fn current_balance<L: LedgerStore>(store: &mut L, customer_id: &str) -> Result<Money, LedgerError> {
    let latest = store.latest_ledger_entry(customer_id).await.map_err(|e| {
        error!("💰️ Could not read the balance for {customer_id}. {e}");
        LedgerError::LedgerReadError(e.to_string())
    })?;
    Ok(latest.map(|e| e.balance).unwrap_or_default())
}

/// Appends a credit or debit to the customer's ledger and returns the new entry.
///
/// The resulting balance is the current balance plus (credit) or minus (debit) `amount`. No sufficiency check is made
/// here: callers that must not overdraw the customer check the balance first, under the same unit of work.
pub async fn append_transaction<L: LedgerStore>(
    store: &mut L,
    customer_id: &str,
    kind: TransactionKind,
    amount: Money,
    description: &str,
) -> Result<LedgerEntry, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(amount));
    }
    if description.trim().is_empty() {
        return Err(LedgerError::MissingDescription);
    }
    let balance = current_balance(store, customer_id).await?;
    let new_balance = kind
        .apply(balance, amount)
        .ok_or_else(|| LedgerError::LedgerWriteError(format!("Applying a {kind} of {amount} to {balance} overflows")))?;
    let entry = NewLedgerEntry {
        customer_id: customer_id.to_string(),
        transaction_type: kind,
        amount,
        description: description.to_string(),
        balance: new_balance,
        created_at: Utc::now(),
    };
    let entry = store.insert_ledger_entry(entry).await.map_err(|e| {
        error!("💰️ Could not append a {kind} of {amount} for {customer_id}. {e}");
        LedgerError::LedgerWriteError(e.to_string())
    })?;
    debug!("💰️ {kind} of {amount} recorded for {customer_id}. Balance: {balance} -> {new_balance}");
    Ok(entry)
}

/// Recomputes a balance by applying each entry, in order, to an opening balance of zero.
///
/// Returns `None` if the running balance overflows.
pub fn replay<'a, I>(entries: I) -> Option<Money>
where I: IntoIterator<Item = &'a LedgerEntry> {
    entries.into_iter().try_fold(Money::zero(), |balance, entry| entry.transaction_type.apply(balance, entry.amount))
}

/// An entry whose recorded resulting balance does not match the replayed balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDiscrepancy {
    pub entry_id: i64,
    pub recorded: Money,
    pub expected: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAudit {
    pub customer_id: String,
    pub entries: usize,
    /// The balance recorded on the newest entry
    pub recorded_balance: Money,
    /// The balance obtained by replaying every entry
    pub replayed_balance: Money,
    pub discrepancies: Vec<LedgerDiscrepancy>,
}

impl LedgerAudit {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty() && self.recorded_balance == self.replayed_balance
    }
}

/// Replays the entries (in append order) and compares every recorded balance with the replayed one.
pub fn audit(customer_id: &str, entries: &[LedgerEntry]) -> LedgerAudit {
    let mut running = Money::zero();
    let mut discrepancies = Vec::new();
    for entry in entries {
        // On overflow, keep comparing against the recorded balance so one bad entry is reported once
        running = entry.transaction_type.apply(running, entry.amount).unwrap_or(entry.balance);
        if running != entry.balance {
            warn!(
                "💰️ Ledger entry #{} for {customer_id} records a balance of {}, but replaying gives {running}",
                entry.id, entry.balance
            );
            discrepancies.push(LedgerDiscrepancy { entry_id: entry.id, recorded: entry.balance, expected: running });
            running = entry.balance;
        }
    }
    let recorded_balance = entries.last().map(|e| e.balance).unwrap_or_default();
    let replayed_balance = replay(entries).unwrap_or(recorded_balance);
    LedgerAudit {
        customer_id: customer_id.to_string(),
        entries: entries.len(),
        recorded_balance,
        replayed_balance,
        discrepancies,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traits::{Pagination, StorageError};

    #[derive(Default)]
    struct MemoryLedger {
        entries: Vec<LedgerEntry>,
        fail_writes: bool,
    }

    impl LedgerStore for MemoryLedger {
        async fn latest_ledger_entry(&mut self, customer_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
            Ok(self.entries.iter().filter(|e| e.customer_id == customer_id).last().cloned())
        }

        async fn insert_ledger_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StorageError> {
            if self.fail_writes {
                return Err(StorageError::DatabaseError("disk full".into()));
            }
            let entry = LedgerEntry {
                id: self.entries.len() as i64 + 1,
                customer_id: entry.customer_id,
                transaction_type: entry.transaction_type,
                amount: entry.amount,
                description: entry.description,
                balance: entry.balance,
                created_at: entry.created_at,
            };
            self.entries.push(entry.clone());
            Ok(entry)
        }

        async fn ledger_entries(
            &mut self,
            customer_id: &str,
            _page: Option<Pagination>,
        ) -> Result<Vec<LedgerEntry>, StorageError> {
            Ok(self.entries.iter().filter(|e| e.customer_id == customer_id).cloned().collect())
        }

        async fn count_ledger_entries(&mut self, customer_id: &str) -> Result<i64, StorageError> {
            Ok(self.entries.iter().filter(|e| e.customer_id == customer_id).count() as i64)
        }
    }

    #[tokio::test]
    async fn balance_is_credits_minus_debits() {
        use TransactionKind::*;
        let mut ledger = MemoryLedger::default();
        assert_eq!(current_balance(&mut ledger, "alice").await.unwrap(), Money::zero());
        let moves = [(Credit, 50_000), (Debit, 30_000), (Credit, 1_000), (Debit, 500), (Debit, 20_000)];
        for (kind, amount) in moves {
            append_transaction(&mut ledger, "alice", kind, Money::from_major(amount), "test").await.unwrap();
        }
        append_transaction(&mut ledger, "bob", Credit, Money::from_major(7), "someone else").await.unwrap();
        let expected = Money::from_major(50_000 - 30_000 + 1_000 - 500 - 20_000);
        assert_eq!(current_balance(&mut ledger, "alice").await.unwrap(), expected);
        // Reading is idempotent
        assert_eq!(current_balance(&mut ledger, "alice").await.unwrap(), expected);
        let entries = ledger.ledger_entries("alice", None).await.unwrap();
        assert_eq!(replay(&entries), Some(expected));
        assert!(audit("alice", &entries).is_consistent());
    }

    #[tokio::test]
    async fn ledger_does_not_block_overdraft() {
        let mut ledger = MemoryLedger::default();
        let entry = append_transaction(&mut ledger, "alice", TransactionKind::Debit, Money::from_major(10), "buy tea")
            .await
            .unwrap();
        assert_eq!(entry.balance, Money::from_major(-10));
    }

    #[tokio::test]
    async fn rejected_transactions() {
        let mut ledger = MemoryLedger::default();
        let err =
            append_transaction(&mut ledger, "alice", TransactionKind::Credit, Money::zero(), "x").await.unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(Money::zero()));
        let err =
            append_transaction(&mut ledger, "alice", TransactionKind::Credit, Money::from(1), "  ").await.unwrap_err();
        assert_eq!(err, LedgerError::MissingDescription);
        ledger.fail_writes = true;
        let err = append_transaction(&mut ledger, "alice", TransactionKind::Credit, Money::from(1), "top up")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::LedgerWriteError(_)));
        assert!(ledger.entries.is_empty());
    }

    #[test]
    fn audit_finds_bad_entries() {
        let entry = |id, kind, amount, balance| LedgerEntry {
            id,
            customer_id: "alice".into(),
            transaction_type: kind,
            amount: Money::from(amount),
            description: "x".into(),
            balance: Money::from(balance),
            created_at: Utc::now(),
        };
        let entries = vec![
            entry(1, TransactionKind::Credit, 100, 100),
            entry(2, TransactionKind::Debit, 30, 80),
            entry(3, TransactionKind::Debit, 10, 70),
        ];
        let report = audit("alice", &entries);
        assert!(!report.is_consistent());
        assert_eq!(report.discrepancies, vec![LedgerDiscrepancy {
            entry_id: 2,
            recorded: Money::from(80),
            expected: Money::from(70)
        }]);
        assert_eq!(report.recorded_balance, Money::from(70));
        assert_eq!(report.replayed_balance, Money::from(60));
    }
}
