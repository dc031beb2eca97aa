use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{LedgerStore, MenuLookup, OrderStore, PromoStore},
};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Stored data is invalid: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StorageError::NotFound("No matching row".to_string()),
            sqlx::Error::Database(de) if de.is_unique_violation() => StorageError::AlreadyExists(de.message().into()),
            sqlx::Error::ColumnDecode { index, source } => {
                StorageError::InvalidData(format!("Could not decode column {index}: {source}"))
            },
            e => StorageError::DatabaseError(e.to_string()),
        }
    }
}

/// A single atomic unit of storage work.
///
/// Everything done through a unit of work becomes visible to others only once [`UnitOfWork::commit`] succeeds.
/// Dropping it without committing discards every change.
#[allow(async_fn_in_trait)]
pub trait UnitOfWork: MenuLookup + LedgerStore + PromoStore + OrderStore {
    /// Claims exclusive access to the customer's balance and orders for the rest of this unit of work.
    ///
    /// Any other unit of work that tries to lock the same customer waits until this one commits or rolls back.
    async fn lock_customer(&mut self, customer_id: &str) -> Result<(), StorageError>;

    /// Claims exclusive access to the order for the rest of this unit of work. Call this before reading the order.
    async fn lock_order(&mut self, order_id: OrderId) -> Result<(), StorageError>;

    async fn commit(self) -> Result<(), StorageError>;

    async fn rollback(self) -> Result<(), StorageError>;
}

/// This trait defines the highest level of behaviour for backends supporting the food order engine.
///
/// Backends hand out [`UnitOfWork`]s. The public APIs use these to compose the lower-level storage traits into atomic
/// operations.
#[allow(async_fn_in_trait)]
pub trait FoodOrderDatabase: Clone {
    type UnitOfWork: UnitOfWork;

    /// The URL of the database
    fn url(&self) -> &str;

    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Self::UnitOfWork, StorageError>;

    /// Closes the database connection pool.
    async fn close(&mut self) -> Result<(), StorageError>;
}
