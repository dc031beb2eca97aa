//! Food Order Engine
//!
//! The food order engine holds the order placement and balance ledger logic of a food ordering backend. It prices
//! orders, redeems promo codes at most once per customer, debits the customer's balance, and stores the order, all in
//! a single atomic step.
//!
//! The library is divided into these main sections:
//! 1. Storage contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need
//!    to access the database directly. Instead, use the public API. The data types used in the database are defined
//!    in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@fo_api`]). [`OrderFlowApi`] places orders and advances their status, [`LedgerApi`] manages
//!    balances, and [`PromoApi`] manages promo codes.
//!
//! The engine also provides a set of events that can be subscribed to ([`mod@events`]). For example, when an order is
//! placed, an `OrderPlacedEvent` is emitted once everything has been committed.
pub mod config;
mod db;
pub mod db_types;
pub mod events;
pub mod fo_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use config::EngineConfig;
#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteUnitOfWork};
pub use fo_api::{
    errors::{LedgerError, OrderFlowError, PricingError, PromoError},
    ledger::{LedgerAudit, LedgerDiscrepancy},
    ledger_api::{LedgerApi, MIN_TOP_UP},
    order_flow_api::OrderFlowApi,
    order_objects::{OrderLine, OrderPlacement, PlaceOrderRequest},
    promo_api::PromoApi,
};
pub use traits::{DateRange, FoodOrderDatabase, Page, Pagination, Paging, StorageError};
