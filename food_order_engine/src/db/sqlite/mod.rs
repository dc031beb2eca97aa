//! # SQLite backend
//!
//! The low-level database interactions in [`ledger`], [`menus`], [`orders`], [`promos`] and [`locks`] are simple
//! functions (rather than stateful structs) that accept a `&mut SqliteConnection` argument. Callers can obtain a
//! connection from a pool, or create an atomic transaction as the need arises and call through to the functions
//! without any other changes.
//!
//! [`SqliteDatabase`] and [`SqliteUnitOfWork`] wire these functions up to the storage traits.
use std::str::FromStr;

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub mod ledger;
pub mod locks;
pub mod menus;
pub mod orders;
pub mod promos;

mod sqlite_impl;

pub use sqlite_impl::{SqliteDatabase, SqliteUnitOfWork};

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    info!("🗃️ Connected to {url}");
    Ok(pool)
}
