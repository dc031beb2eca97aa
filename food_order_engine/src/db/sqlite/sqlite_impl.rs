//! `SqliteDatabase` is a concrete implementation of a food order engine backend.
//!
//! Every unit of work is a single SQLite transaction. Read-only work uses the same mechanism; the transaction is
//! simply committed without having written anything.
use std::fmt::Debug;

use log::*;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{ledger, locks, menus, new_pool, orders, promos};
use crate::{
    config::EngineConfig,
    db_types::{
        LedgerEntry,
        MenuItem,
        Money,
        NewLedgerEntry,
        NewOrder,
        NewPromo,
        Order,
        OrderId,
        OrderStatusType,
        Promo,
    },
    traits::{
        FoodOrderDatabase,
        LedgerStore,
        MenuLookup,
        OrderQueryFilter,
        OrderStore,
        Pagination,
        PromoStore,
        StorageError,
        UnitOfWork,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl FoodOrderDatabase for SqliteDatabase {
    type UnitOfWork = SqliteUnitOfWork;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn begin(&self) -> Result<Self::UnitOfWork, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteUnitOfWork { tx })
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool using the database URL and pool size in the configuration. Migrations are
    /// applied if the configuration asks for them.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, StorageError> {
        let db = Self::new_with_url(&config.database_url, config.max_connections).await?;
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await.map_err(|e| {
            error!("🗃️ Could not run database migrations. {e}");
            StorageError::DatabaseError(e.to_string())
        })?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Adds an item to the menu, or re-prices it if it already exists.
    ///
    /// Menus are owned by the catalogue service. This is provided for seeding and testing.
    pub async fn upsert_menu_item(&self, name: &str, price: Money) -> Result<MenuItem, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let item = menus::upsert_menu_item(name, price, &mut conn).await?;
        Ok(item)
    }
}

/// A unit of work backed by a single SQLite transaction.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork for SqliteUnitOfWork {
    async fn lock_customer(&mut self, customer_id: &str) -> Result<(), StorageError> {
        locks::lock_customer(customer_id, &mut self.tx).await?;
        Ok(())
    }

    async fn lock_order(&mut self, order_id: OrderId) -> Result<(), StorageError> {
        locks::lock_order(order_id, &mut self.tx).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl MenuLookup for SqliteUnitOfWork {
    async fn fetch_menu_item(&mut self, name: &str) -> Result<Option<MenuItem>, StorageError> {
        let item = menus::fetch_menu_item_by_name(name, &mut self.tx).await?;
        Ok(item)
    }
}

impl LedgerStore for SqliteUnitOfWork {
    async fn latest_ledger_entry(&mut self, customer_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
        let entry = ledger::latest_entry(customer_id, &mut self.tx).await?;
        Ok(entry)
    }

    async fn insert_ledger_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, StorageError> {
        let entry = ledger::insert_entry(entry, &mut self.tx).await?;
        Ok(entry)
    }

    async fn ledger_entries(
        &mut self,
        customer_id: &str,
        page: Option<Pagination>,
    ) -> Result<Vec<LedgerEntry>, StorageError> {
        let entries = ledger::entries_for_customer(customer_id, page, &mut self.tx).await?;
        Ok(entries)
    }

    async fn count_ledger_entries(&mut self, customer_id: &str) -> Result<i64, StorageError> {
        let count = ledger::count_entries(customer_id, &mut self.tx).await?;
        Ok(count)
    }
}

impl PromoStore for SqliteUnitOfWork {
    async fn fetch_promo_by_code(&mut self, code: &str) -> Result<Option<Promo>, StorageError> {
        let promo = promos::fetch_promo_by_code(code, &mut self.tx).await?;
        Ok(promo)
    }

    async fn fetch_promo(&mut self, id: i64) -> Result<Option<Promo>, StorageError> {
        let promo = promos::fetch_promo_by_id(id, &mut self.tx).await?;
        Ok(promo)
    }

    async fn count_promo_uses(&mut self, customer_id: &str, code: &str) -> Result<i64, StorageError> {
        let count = promos::count_promo_uses(customer_id, code, &mut self.tx).await?;
        Ok(count)
    }

    async fn mark_promo_used(&mut self, order_id: OrderId) -> Result<(), StorageError> {
        promos::mark_promo_used(order_id, &mut self.tx).await
    }

    async fn insert_promo(&mut self, promo: NewPromo) -> Result<Promo, StorageError> {
        let promo = promos::insert_promo(promo, &mut self.tx).await?;
        Ok(promo)
    }

    async fn delete_promo(&mut self, id: i64) -> Result<bool, StorageError> {
        let deleted = promos::delete_promo(id, &mut self.tx).await?;
        Ok(deleted)
    }

    async fn promos(&mut self, page: Pagination) -> Result<Vec<Promo>, StorageError> {
        let promos = promos::fetch_promos(page, &mut self.tx).await?;
        Ok(promos)
    }

    async fn count_promos(&mut self) -> Result<i64, StorageError> {
        let count = promos::count_promos(&mut self.tx).await?;
        Ok(count)
    }

    async fn promos_available_for_customer(
        &mut self,
        customer_id: &str,
        page: Pagination,
    ) -> Result<Vec<Promo>, StorageError> {
        let promos = promos::fetch_promos_available_for_customer(customer_id, page, &mut self.tx).await?;
        Ok(promos)
    }

    async fn count_promos_available_for_customer(&mut self, customer_id: &str) -> Result<i64, StorageError> {
        let count = promos::count_promos_available_for_customer(customer_id, &mut self.tx).await?;
        Ok(count)
    }
}

impl OrderStore for SqliteUnitOfWork {
    async fn count_active_orders(&mut self, customer_id: &str) -> Result<i64, StorageError> {
        let count = orders::count_active_orders(customer_id, &mut self.tx).await?;
        Ok(count)
    }

    async fn fetch_active_order(&mut self, customer_id: &str) -> Result<Option<Order>, StorageError> {
        let order = orders::fetch_active_order(customer_id, &mut self.tx).await?;
        Ok(order)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StorageError> {
        let order = orders::insert_order(order, &mut self.tx).await?;
        Ok(order)
    }

    async fn fetch_order(&mut self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let order = orders::fetch_order(id, &mut self.tx).await?;
        Ok(order)
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError> {
        let order = orders::update_order_status(id, from, to, &mut self.tx).await?;
        Ok(order)
    }

    async fn search_orders(
        &mut self,
        filter: &OrderQueryFilter,
        page: Pagination,
    ) -> Result<Vec<Order>, StorageError> {
        let orders = orders::search_orders(filter, page, &mut self.tx).await?;
        Ok(orders)
    }

    async fn count_orders(&mut self, filter: &OrderQueryFilter) -> Result<i64, StorageError> {
        let count = orders::count_orders(filter, &mut self.tx).await?;
        Ok(count)
    }
}
