use serde::{Deserialize, Serialize};

use crate::db_types::{LedgerEntry, Order, OrderStatusType};

/// Published once an order, its debit, and any promo mark have been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
    /// The debit that paid for the order
    pub debit: LedgerEntry,
}

impl OrderPlacedEvent {
    pub fn new(order: Order, debit: LedgerEntry) -> Self {
        Self { order, debit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub old_status: OrderStatusType,
    pub order: Order,
}

impl OrderStatusChangedEvent {
    pub fn new(old_status: OrderStatusType, order: Order) -> Self {
        Self { old_status, order }
    }

    pub fn new_status(&self) -> OrderStatusType {
        self.order.status
    }
}
