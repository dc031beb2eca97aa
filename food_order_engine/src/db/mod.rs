//! Database backends for the food order engine.
#[cfg(feature = "sqlite")]
pub mod sqlite;
