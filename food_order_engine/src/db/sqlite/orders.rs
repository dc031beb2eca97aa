use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType},
    traits::{OrderQueryFilter, Pagination},
};

const ITEM_COLUMNS: &str = r#"
    SELECT oi.id, oi.order_id, oi.menu_id, m.name AS menu_name, oi.quantity, oi.unit_price
    FROM order_items oi JOIN menus m ON m.id = oi.menu_id
"#;

/// Inserts a new order and its items using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    let mut inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                customer_id,
                address,
                promo_code,
                status,
                note,
                date,
                total_price,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(order.address)
    .bind(order.promo_code.filter(|c| !c.is_empty()))
    .bind(order.status.as_str())
    .bind(order.note)
    .bind(order.date)
    .bind(order.total_price)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    for item in order.items {
        insert_item(inserted.id, item, conn).await?;
    }
    inserted.items = fetch_items(inserted.id, conn).await?;
    debug!("🗃️ Order {} inserted with {} line items", inserted.id, inserted.items.len());
    Ok(inserted)
}

async fn insert_item(order_id: OrderId, item: NewOrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, menu_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
        .bind(order_id)
        .bind(item.menu_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_items(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let sql = format!("{ITEM_COLUMNS} WHERE oi.order_id = $1 ORDER BY oi.id");
    let items = sqlx::query_as(&sql).bind(order_id).fetch_all(conn).await?;
    Ok(items)
}

/// Fills in the line items for every order in the slice using a single query.
async fn attach_items(orders: &mut [Order], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }
    let mut builder = QueryBuilder::<Sqlite>::new(ITEM_COLUMNS);
    builder.push(" WHERE oi.order_id IN (");
    let mut ids = builder.separated(", ");
    for order in orders.iter() {
        ids.push_bind(order.id);
    }
    builder.push(") ORDER BY oi.id");
    let items: Vec<OrderItem> = builder.build_query_as().fetch_all(conn).await?;
    for order in orders.iter_mut() {
        order.items = items.iter().filter(|i| i.order_id == order.id).cloned().collect();
    }
    Ok(())
}

pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn count_active_orders(customer_id: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND status <> $2")
        .bind(customer_id)
        .bind(OrderStatusType::Delivered.as_str())
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn fetch_active_order(customer_id: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE customer_id = $1 AND status <> $2 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(customer_id)
    .bind(OrderStatusType::Delivered.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

/// Moves an order from one status to another. The `WHERE` clause includes the expected current status, so if another
/// caller got there first, nothing is updated and `None` is returned.
pub async fn update_order_status(
    id: OrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        trace!("🗃️ Order {id} is not in status '{from}'. Nothing was updated");
        return Ok(None);
    }
    fetch_order(id, conn).await
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &OrderQueryFilter) {
    if filter.is_empty() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(cid) = &filter.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid.clone());
    }
    if !filter.statuses.is_empty() {
        where_clause.push("status IN (");
        for (i, status) in filter.statuses.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status.as_str());
        }
        where_clause.push_unseparated(")");
    }
    if let Some(since) = filter.date_range.since {
        where_clause.push("date >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = filter.date_range.until {
        where_clause.push("date <= ");
        where_clause.push_bind_unseparated(until);
    }
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`, newest first.
pub async fn search_orders(
    filter: &OrderQueryFilter,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM orders");
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY date DESC, id DESC LIMIT ");
    builder.push_bind(page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(page.offset());
    trace!("🗃️ Executing query: {}", builder.sql());
    let mut orders: Vec<Order> = builder.build_query_as().fetch_all(&mut *conn).await?;
    attach_items(&mut orders, conn).await?;
    Ok(orders)
}

pub async fn count_orders(filter: &OrderQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}
