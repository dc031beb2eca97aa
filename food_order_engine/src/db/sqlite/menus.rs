use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{MenuItem, Money};

pub async fn fetch_menu_item_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<MenuItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT id, name, price FROM menus WHERE name = $1")
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(item)
}

/// Inserts a menu item, or updates its price if an item with the same name already exists.
pub async fn upsert_menu_item(name: &str, price: Money, conn: &mut SqliteConnection) -> Result<MenuItem, sqlx::Error> {
    let item: MenuItem = sqlx::query_as(
        r#"
            INSERT INTO menus (name, price) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET price = excluded.price
            RETURNING id, name, price;
        "#,
    )
    .bind(name)
    .bind(price)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Menu item '{}' (#{}) is priced at {}", item.name, item.id, item.price);
    Ok(item)
}
