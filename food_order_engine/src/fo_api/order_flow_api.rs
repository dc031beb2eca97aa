use std::fmt::Debug;

use chrono::Utc;
use food_common::helpers::human_list;
use log::*;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderStatusType, TransactionKind},
    events::{EventProducers, OrderPlacedEvent, OrderStatusChangedEvent},
    fo_api::{
        errors::OrderFlowError,
        ledger,
        order_objects::{OrderPlacement, PlaceOrderRequest},
        order_status,
        pricing,
        promo_redemption,
    },
    traits::{DateRange, FoodOrderDatabase, OrderQueryFilter, OrderStore, Page, Pagination, UnitOfWork},
};

/// `OrderFlowApi` is the primary API for placing orders and moving them through their lifecycle.
///
/// Every state-changing call runs inside a single [`UnitOfWork`], and events are only published once that unit of
/// work has committed.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: FoodOrderDatabase
{
    /// Places an order for a customer.
    ///
    /// The whole placement is atomic. The customer is locked first, so two placements for the same customer can never
    /// both pass the balance check against the same balance. Then, in order:
    /// 1. the order lines are priced against the menu,
    /// 2. the customer must not have any undelivered orders,
    /// 3. the promo code (if any) is redeemed and applied,
    /// 4. the order is validated,
    /// 5. the customer's balance must cover the total,
    /// 6. the total is debited from the customer's balance,
    /// 7. the order and its items are stored,
    /// 8. the promo is marked as used.
    ///
    /// If any of steps 1 to 7 fails, nothing is written. A failure in step 8 is logged, and the order still stands
    /// (see [`OrderPlacement::promo_marked`]).
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<OrderPlacement, OrderFlowError> {
        let customer_id = request.customer_id.clone();
        let mut tx = self.db.begin().await?;
        tx.lock_customer(&customer_id).await?;
        let placement = match place_order_in(&mut tx, &request).await {
            Ok(p) => p,
            Err(e) => {
                debug!("🧾️ Order for {customer_id} was rejected. {e}");
                if let Err(rb) = tx.rollback().await {
                    warn!("🧾️ Could not roll back the rejected order for {customer_id}. {rb}");
                }
                return Err(e);
            },
        };
        tx.commit().await.map_err(|e| {
            error!("🧾️ Could not commit order for {customer_id}. Nothing has been charged. {e}");
            OrderFlowError::OrderPersistFailed(e.to_string())
        })?;
        info!(
            "🧾️ Order {} placed for {customer_id}. {} charged, balance is now {}",
            placement.order.id,
            placement.order.total_price,
            placement.balance_after()
        );
        let event = OrderPlacedEvent::new(placement.order.clone(), placement.ledger_entry.clone());
        self.producers.publish_order_placed(event).await;
        Ok(placement)
    }

    /// Moves the order on to its next status. Delivered orders cannot be advanced.
    ///
    /// The order is locked before it is read, so the status change waits its turn behind any placement or top-up that
    /// is in flight instead of failing.
    pub async fn advance_order_status(&self, order_id: OrderId) -> Result<Order, OrderFlowError> {
        let mut tx = self.db.begin().await?;
        tx.lock_order(order_id).await?;
        let (old_status, order) = match order_status::advance(&mut tx, order_id).await {
            Ok(result) => result,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!("🚚️ Could not roll back status change for order {order_id}. {rb}");
                }
                return Err(e);
            },
        };
        tx.commit().await?;
        let event = OrderStatusChangedEvent::new(old_status, order.clone());
        self.producers.publish_status_changed(event).await;
        Ok(order)
    }

    /// The customer's current undelivered order, if they have one.
    pub async fn active_order(&self, customer_id: &str) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.db.begin().await?;
        let order = tx.fetch_active_order(customer_id).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// The customer's delivered orders, newest first, optionally restricted to orders placed within `date_range`.
    pub async fn order_history(
        &self,
        customer_id: &str,
        page: Pagination,
        date_range: DateRange,
    ) -> Result<Page<Order>, OrderFlowError> {
        let filter = OrderQueryFilter::default()
            .with_customer_id(customer_id)
            .with_status(OrderStatusType::Delivered)
            .with_date_range(date_range);
        self.search(filter, page).await
    }

    /// All orders, newest first. If `statuses` is not empty, only orders in one of those statuses are returned.
    pub async fn orders(
        &self,
        page: Pagination,
        statuses: &[OrderStatusType],
    ) -> Result<Page<Order>, OrderFlowError> {
        let filter = OrderQueryFilter::default().with_statuses(statuses);
        self.search(filter, page).await
    }

    pub async fn order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.db.begin().await?;
        let order = tx.fetch_order(order_id).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn search(&self, filter: OrderQueryFilter, page: Pagination) -> Result<Page<Order>, OrderFlowError> {
        let mut tx = self.db.begin().await?;
        let total_rows = tx.count_orders(&filter).await?;
        let orders = tx.search_orders(&filter, page).await?;
        tx.commit().await?;
        Ok(Page::new(orders, page.paging(total_rows)))
    }
}

async fn place_order_in<U: UnitOfWork>(
    tx: &mut U,
    request: &PlaceOrderRequest,
) -> Result<OrderPlacement, OrderFlowError> {
    let customer_id = request.customer_id.as_str();
    let now = Utc::now();
    let priced = pricing::price_order(tx, &request.items).await?;
    trace!("🧾️ Subtotal for {customer_id} is {}", priced.subtotal);

    let active = tx.count_active_orders(customer_id).await?;
    if active > 0 {
        return Err(OrderFlowError::UnfinishedOrderExists(customer_id.to_string()));
    }

    let (total, discount) = match request.promo_code() {
        Some(code) => {
            let promo = promo_redemption::redeem(tx, code, customer_id, now).await?;
            let discount = promo.discount();
            let total = promo_redemption::apply_discount(priced.subtotal, discount)?;
            trace!("🧾️ Promo {code} ({discount}) brings {} down to {total}", priced.subtotal);
            (total, Some(discount))
        },
        None => (priced.subtotal, None),
    };

    let order = NewOrder {
        customer_id: customer_id.to_string(),
        address: request.address.trim().to_string(),
        promo_code: discount.and(request.promo_code()).map(String::from),
        status: OrderStatusType::Preparing,
        note: request.note.clone(),
        date: now,
        total_price: total,
        items: priced.items,
    };
    validate_new_order(&order)?;

    let balance = ledger::current_balance(tx, customer_id).await?;
    if total > balance {
        return Err(OrderFlowError::InsufficientBalance { total, balance });
    }

    let description = debit_description(&order.items);
    let ledger_entry =
        ledger::append_transaction(tx, customer_id, TransactionKind::Debit, total, &description).await?;

    let mut order = tx.insert_order(order).await.map_err(|e| {
        error!("🧾️ Could not store the order for {customer_id}. The debit will be rolled back. {e}");
        OrderFlowError::OrderPersistFailed(e.to_string())
    })?;

    let promo_marked = match &order.promo_code {
        Some(code) => match promo_redemption::mark_used(tx, order.id).await {
            Ok(()) => {
                order.promo_used = true;
                true
            },
            Err(e) => {
                error!(
                    "🎟️ Order {} was placed, but promo {code} could not be marked as used. {customer_id} may be able \
                     to use it again. {e}",
                    order.id
                );
                false
            },
        },
        None => false,
    };

    Ok(OrderPlacement { order, ledger_entry, discount, promo_marked })
}

/// Checks the fields a stored order requires.
pub fn validate_new_order(order: &NewOrder) -> Result<(), OrderFlowError> {
    if order.customer_id.trim().is_empty() {
        return Err(OrderFlowError::ValidationFailed("A customer is required".into()));
    }
    if order.address.trim().is_empty() {
        return Err(OrderFlowError::ValidationFailed("A delivery address is required".into()));
    }
    if order.items.is_empty() {
        return Err(OrderFlowError::ValidationFailed("An order needs at least one item".into()));
    }
    if let Some(item) = order.items.iter().find(|i| i.quantity <= 0) {
        return Err(OrderFlowError::ValidationFailed(format!("The quantity of {} must be positive", item.menu_name)));
    }
    if !order.total_price.is_positive() {
        return Err(OrderFlowError::ValidationFailed(format!(
            "The order total must be positive, but is {}",
            order.total_price
        )));
    }
    Ok(())
}

/// A human-readable description of the items, e.g. `buy 2 Fried Rice, 1 Iced Tea and 3 Satay`.
pub fn debit_description(items: &[NewOrderItem]) -> String {
    let lines = items.iter().map(|i| format!("{} {}", i.quantity, i.menu_name)).collect::<Vec<String>>();
    format!("buy {}", human_list(&lines))
}
