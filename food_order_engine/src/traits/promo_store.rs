use crate::{
    db_types::{NewPromo, OrderId, Promo},
    traits::{Pagination, StorageError},
};

/// Storage for promo codes and their per-customer usage.
///
/// Usage is not tracked on the promo itself. An order carries the code it was placed with, and a `promo_used` flag
/// that is set once the code has been consumed.
#[allow(async_fn_in_trait)]
pub trait PromoStore {
    async fn fetch_promo_by_code(&mut self, code: &str) -> Result<Option<Promo>, StorageError>;

    async fn fetch_promo(&mut self, id: i64) -> Result<Option<Promo>, StorageError>;

    /// The number of the customer's orders on which `code` has been marked as used.
    async fn count_promo_uses(&mut self, customer_id: &str, code: &str) -> Result<i64, StorageError>;

    /// Records that the promo code carried by the given order has been consumed.
    ///
    /// If this call fails, the caller's enclosing unit of work must still be usable. Implementations that share a
    /// transaction with the caller should isolate the write (e.g. with a savepoint).
    async fn mark_promo_used(&mut self, order_id: OrderId) -> Result<(), StorageError>;

    /// Inserts a new promo. Fails with [`StorageError::AlreadyExists`] if the code is taken.
    async fn insert_promo(&mut self, promo: NewPromo) -> Result<Promo, StorageError>;

    /// Deletes the promo with the given id, returning `false` if there was no such promo.
    async fn delete_promo(&mut self, id: i64) -> Result<bool, StorageError>;

    async fn promos(&mut self, page: Pagination) -> Result<Vec<Promo>, StorageError>;

    async fn count_promos(&mut self) -> Result<i64, StorageError>;

    /// Promos whose code has not yet been used on any of the customer's orders.
    async fn promos_available_for_customer(
        &mut self,
        customer_id: &str,
        page: Pagination,
    ) -> Result<Vec<Promo>, StorageError>;

    async fn count_promos_available_for_customer(&mut self, customer_id: &str) -> Result<i64, StorageError>;
}
