//! The order status state machine: `preparing` → `out for delivery` → `delivered`.
use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatusType},
    fo_api::errors::OrderFlowError,
    traits::OrderStore,
};

/// The status that follows `current`, or `InvalidStatusTransition` if `current` is terminal.
pub fn next_status(current: OrderStatusType) -> Result<OrderStatusType, OrderFlowError> {
    current.next().ok_or(OrderFlowError::InvalidStatusTransition(current))
}

/// Moves the order one step along its lifecycle and returns its previous status along with the updated order.
pub async fn advance<O: OrderStore>(
    store: &mut O,
    order_id: OrderId,
) -> Result<(OrderStatusType, Order), OrderFlowError> {
    let order = store.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
    let from = order.status;
    let to = next_status(from).map_err(|e| {
        debug!("🚚️ Order {order_id} is already {from}");
        e
    })?;
    let updated = store.update_order_status(order_id, from, to).await?.ok_or_else(|| {
        warn!("🚚️ Order {order_id} changed status while it was being advanced from {from}");
        OrderFlowError::InvalidStatusTransition(from)
    })?;
    info!("🚚️ Order {order_id} for {} is now {to}", updated.customer_id);
    Ok((from, updated))
}
