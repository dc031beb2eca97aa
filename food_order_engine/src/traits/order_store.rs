use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{OrderQueryFilter, Pagination, StorageError},
};

/// Storage for orders and their line items. Every `Order` returned by this trait has its `items` populated.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// The number of the customer's orders that have not been delivered yet.
    async fn count_active_orders(&mut self, customer_id: &str) -> Result<i64, StorageError>;

    /// The customer's most recent order that has not been delivered yet.
    async fn fetch_active_order(&mut self, customer_id: &str) -> Result<Option<Order>, StorageError>;

    /// Stores the order and all of its items. Either everything is written, or nothing is.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StorageError>;

    async fn fetch_order(&mut self, id: OrderId) -> Result<Option<Order>, StorageError>;

    /// Moves the order from status `from` to status `to`.
    ///
    /// The update only applies if the order is still in status `from`. Returns `None` if no order matched, which
    /// happens if the order does not exist or another caller changed its status first.
    async fn update_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError>;

    /// Searches for orders, newest first.
    async fn search_orders(
        &mut self,
        filter: &OrderQueryFilter,
        page: Pagination,
    ) -> Result<Vec<Order>, StorageError>;

    async fn count_orders(&mut self, filter: &OrderQueryFilter) -> Result<i64, StorageError>;
}
