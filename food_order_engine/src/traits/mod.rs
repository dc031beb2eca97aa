//! # Storage contracts
//!
//! This module defines the interface contracts that database *backends* must satisfy to be used by the order engine.
//!
//! * [`MenuLookup`] resolves menu item names to prices. Menus are maintained elsewhere; the engine only reads them.
//! * [`LedgerStore`] stores the append-only balance ledger.
//! * [`PromoStore`] stores promo codes and records their use.
//! * [`OrderStore`] stores orders and their line items.
//! * [`UnitOfWork`] bundles all of the above into a single atomic transaction.
//! * [`FoodOrderDatabase`] is the backend itself, and hands out units of work.
mod data_objects;
mod food_order_database;
mod ledger_store;
mod menu_lookup;
mod order_store;
mod promo_store;

pub use data_objects::{DateRange, OrderQueryFilter, Page, Pagination, Paging, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use food_order_database::{FoodOrderDatabase, StorageError, UnitOfWork};
pub use ledger_store::LedgerStore;
pub use menu_lookup::MenuLookup;
pub use order_store::OrderStore;
pub use promo_store::PromoStore;
