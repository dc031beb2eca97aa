use crate::{
    db_types::{LedgerEntry, NewLedgerEntry},
    traits::{Pagination, StorageError},
};

/// Storage for the append-only balance ledger.
///
/// Implementations must never expose a way to modify or remove an entry once it has been written.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// The most recently created ledger entry for the customer, if any.
    async fn latest_ledger_entry(&mut self, customer_id: &str) -> Result<Option<LedgerEntry>, StorageError>;

    /// Appends a new entry. The resulting balance has already been calculated by the caller.
    async fn insert_ledger_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StorageError>;

    /// Fetches the customer's entries in append order. If `page` is `None`, every entry is returned.
    async fn ledger_entries(
        &mut self,
        customer_id: &str,
        page: Option<Pagination>,
    ) -> Result<Vec<LedgerEntry>, StorageError>;

    async fn count_ledger_entries(&mut self, customer_id: &str) -> Result<i64, StorageError>;
}
