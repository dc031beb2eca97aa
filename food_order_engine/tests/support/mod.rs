#![allow(dead_code)]
//! Shared set-up for the integration tests. Every test gets its own SQLite file in the temp directory.
use chrono::{Duration, Utc};

use food_order_engine::{
    db_types::{Discount, MenuItem, Money, NewPromo},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path},
    EngineConfig,
    FoodOrderDatabase,
    LedgerApi,
    OrderFlowApi,
    PromoApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates and migrates a brand-new database.
pub async fn new_database() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let config = EngineConfig { max_connections: 5, run_migrations: false, ..EngineConfig::new(&url) };
    let db = SqliteDatabase::from_config(&config).await.expect("Error creating database");
    debug!("🚀️ Test database created at {}", db.url());
    db
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to remove database {url}: {e}");
    }
}

pub struct TestSystem {
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub ledger: LedgerApi<SqliteDatabase>,
    pub promos: PromoApi<SqliteDatabase>,
}

impl TestSystem {
    pub async fn new() -> Self {
        Self::with_producers(EventProducers::default()).await
    }

    pub async fn with_producers(producers: EventProducers) -> Self {
        let db = new_database().await;
        let orders = OrderFlowApi::new(db.clone(), producers);
        let ledger = LedgerApi::new(db.clone());
        let promos = PromoApi::new(db.clone());
        Self { db, orders, ledger, promos }
    }

    /// Seeds the menu. Prices are in whole currency units.
    pub async fn with_menu(self, items: &[(&str, i64)]) -> Self {
        for (name, price) in items {
            self.add_menu_item(name, *price).await;
        }
        self
    }

    pub async fn add_menu_item(&self, name: &str, price: i64) -> MenuItem {
        self.db.upsert_menu_item(name, Money::from_major(price)).await.expect("Error adding menu item")
    }

    pub async fn top_up(&self, customer_id: &str, amount: i64) {
        self.ledger.top_up(customer_id, Money::from_major(amount), "top up").await.expect("Error topping up balance");
    }

    pub async fn balance(&self, customer_id: &str) -> Money {
        self.ledger.balance(customer_id).await.expect("Error reading balance")
    }

    /// Creates a promo that started an hour ago and ends in a day.
    pub async fn add_promo(&self, code: &str, discount: Discount) {
        let now = Utc::now();
        let promo = NewPromo::new("emp-1", code, discount, now - Duration::hours(1), now + Duration::days(1));
        self.promos.create_promo(promo).await.expect("Error creating promo");
    }

    pub async fn tear_down(self) {
        tear_down(self.db).await;
    }
}
