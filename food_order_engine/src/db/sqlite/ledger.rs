use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{LedgerEntry, NewLedgerEntry},
    traits::Pagination,
};

/// Returns the customer's most recently created ledger entry. Entries created at the same instant are ordered by id.
pub async fn latest_entry(customer_id: &str, conn: &mut SqliteConnection) -> Result<Option<LedgerEntry>, sqlx::Error> {
    let entry = sqlx::query_as(
        r#"
            SELECT * FROM balances
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        "#,
    )
    .bind(customer_id)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}

/// Appends a new entry to the ledger. There is no corresponding update or delete; the schema rejects both.
pub async fn insert_entry(entry: NewLedgerEntry, conn: &mut SqliteConnection) -> Result<LedgerEntry, sqlx::Error> {
    let entry: LedgerEntry = sqlx::query_as(
        r#"
            INSERT INTO balances (customer_id, transaction_type, amount, description, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(entry.customer_id)
    .bind(entry.transaction_type.as_str())
    .bind(entry.amount)
    .bind(entry.description)
    .bind(entry.balance)
    .bind(entry.created_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Ledger entry #{} appended for {}. Balance is now {}", entry.id, entry.customer_id, entry.balance);
    Ok(entry)
}

/// Fetches the customer's ledger entries in append order.
pub async fn entries_for_customer(
    customer_id: &str,
    page: Option<Pagination>,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let entries = match page {
        Some(page) => {
            sqlx::query_as(
                r#"
                    SELECT * FROM balances WHERE customer_id = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2 OFFSET $3
                "#,
            )
            .bind(customer_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(conn)
            .await?
        },
        None => {
            sqlx::query_as("SELECT * FROM balances WHERE customer_id = $1 ORDER BY created_at ASC, id ASC")
                .bind(customer_id)
                .fetch_all(conn)
                .await?
        },
    };
    Ok(entries)
}

pub async fn count_entries(customer_id: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM balances WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}
