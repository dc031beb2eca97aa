use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::OrderId;

/// Writes the customer's lock row.
///
/// When this is the first statement of a transaction, SQLite hands that transaction the database write lock, and
/// every other transaction that tries to write waits (up to the busy timeout) until it commits or rolls back.
pub async fn lock_customer(customer_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO customer_locks (customer_id, locked_at) VALUES ($1, $2)
            ON CONFLICT (customer_id) DO UPDATE SET locked_at = excluded.locked_at
        "#,
    )
    .bind(customer_id)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    trace!("🗃️ Customer {customer_id} locked");
    Ok(())
}

/// Writes the order's lock row. This takes the database write lock in the same way as [`lock_customer`].
pub async fn lock_order(order_id: OrderId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO order_locks (order_id, locked_at) VALUES ($1, $2)
            ON CONFLICT (order_id) DO UPDATE SET locked_at = excluded.locked_at
        "#,
    )
    .bind(order_id.value())
    .bind(Utc::now())
    .execute(conn)
    .await?;
    trace!("🗃️ Order {order_id} locked");
    Ok(())
}
