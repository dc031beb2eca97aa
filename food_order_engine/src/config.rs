use std::env;

use food_common::helpers::parse_boolean_flag;
use log::*;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/food_orders.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub database_url: String,
    /// The maximum number of connections in the database pool
    pub max_connections: u32,
    /// If true, pending database migrations are applied when the database is opened
    pub run_migrations: bool,
    /// The channel capacity of each event handler
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn new(database_url: &str) -> Self {
        Self { database_url: database_url.to_string(), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let database_url = env::var("FOE_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ FOE_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_connections = parse_env("FOE_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let run_migrations = parse_boolean_flag(env::var("FOE_RUN_MIGRATIONS").ok(), true);
        let event_buffer_size = parse_env("FOE_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        info!("🪛️ Engine configuration loaded. Database: {database_url}, pool size: {max_connections}");
        Self { database_url, max_connections, run_migrations, event_buffer_size }
    }
}

fn parse_env<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
