use chrono::Utc;
use log::{debug, warn};
use sqlx::{Connection, SqliteConnection};

use crate::{
    db_types::{NewPromo, OrderId, Promo},
    traits::{Pagination, StorageError},
};

pub async fn fetch_promo_by_code(code: &str, conn: &mut SqliteConnection) -> Result<Option<Promo>, sqlx::Error> {
    let promo = sqlx::query_as("SELECT * FROM promos WHERE promo_code = $1").bind(code).fetch_optional(conn).await?;
    Ok(promo)
}

pub async fn fetch_promo_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Promo>, sqlx::Error> {
    let promo = sqlx::query_as("SELECT * FROM promos WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(promo)
}

/// Counts the customer's orders that carry the promo code and have consumed it.
pub async fn count_promo_uses(customer_id: &str, code: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND promo_code = $2 AND promo_used = 1",
    )
    .bind(customer_id)
    .bind(code)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Sets the `promo_used` flag on the order.
///
/// The update runs under a savepoint. If it fails, only the savepoint is rolled back, so the connection's enclosing
/// transaction (if any) can carry on and commit.
pub async fn mark_promo_used(order_id: OrderId, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let mut savepoint = conn.begin().await?;
    let result = sqlx::query(
        r#"
            UPDATE orders SET promo_used = 1, updated_at = $1
            WHERE id = $2 AND promo_code IS NOT NULL AND promo_code <> ''
        "#,
    )
    .bind(Utc::now())
    .bind(order_id)
    .execute(&mut *savepoint)
    .await;
    match result {
        Ok(r) if r.rows_affected() == 1 => {
            savepoint.commit().await?;
            debug!("🗃️ Promo on order {order_id} marked as used");
            Ok(())
        },
        Ok(_) => {
            savepoint.rollback().await?;
            warn!("🗃️ Order {order_id} does not exist or carries no promo code");
            Err(StorageError::NotFound(format!("Order {order_id} with a promo code")))
        },
        Err(e) => {
            savepoint.rollback().await?;
            Err(e.into())
        },
    }
}

pub async fn insert_promo(promo: NewPromo, conn: &mut SqliteConnection) -> Result<Promo, sqlx::Error> {
    let now = Utc::now();
    let promo = sqlx::query_as(
        r#"
            INSERT INTO promos (
                employee_id,
                promo_code,
                discount,
                is_percentage,
                start_date,
                end_date,
                description,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(promo.employee_id)
    .bind(promo.promo_code)
    .bind(promo.discount.raw_value())
    .bind(promo.discount.is_percentage())
    .bind(promo.start_date)
    .bind(promo.end_date)
    .bind(promo.description)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(promo)
}

pub async fn delete_promo(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM promos WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_promos(page: Pagination, conn: &mut SqliteConnection) -> Result<Vec<Promo>, sqlx::Error> {
    let promos = sqlx::query_as("SELECT * FROM promos ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2")
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(conn)
        .await?;
    Ok(promos)
}

pub async fn count_promos(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM promos").fetch_one(conn).await?;
    Ok(count)
}

const UNUSED_BY_CUSTOMER: &str = r#"
    NOT EXISTS (
        SELECT 1 FROM orders o
        WHERE o.customer_id = $1 AND o.promo_code = p.promo_code AND o.promo_used = 1
    )
"#;

pub async fn fetch_promos_available_for_customer(
    customer_id: &str,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Promo>, sqlx::Error> {
    let sql = format!(
        "SELECT p.* FROM promos p WHERE {UNUSED_BY_CUSTOMER} ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"
    );
    let promos = sqlx::query_as(&sql)
        .bind(customer_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(conn)
        .await?;
    Ok(promos)
}

pub async fn count_promos_available_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM promos p WHERE {UNUSED_BY_CUSTOMER}");
    let count = sqlx::query_scalar(&sql).bind(customer_id).fetch_one(conn).await?;
    Ok(count)
}
