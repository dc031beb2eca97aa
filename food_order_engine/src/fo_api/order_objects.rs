use serde::{Deserialize, Serialize};

use crate::db_types::{Discount, LedgerEntry, Money, NewOrderItem, Order};

/// One line of an order request: a menu item by name, and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_name: String,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new<S: Into<String>>(menu_name: S, quantity: i64) -> Self {
        Self { menu_name: menu_name.into(), quantity }
    }
}

/// A request to place an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub address: String,
    /// An empty code is the same as no code
    pub promo_code: Option<String>,
    pub note: String,
    pub items: Vec<OrderLine>,
}

impl PlaceOrderRequest {
    pub fn new<C: Into<String>, A: Into<String>>(customer_id: C, address: A) -> Self {
        Self { customer_id: customer_id.into(), address: address.into(), ..Default::default() }
    }

    pub fn with_item<S: Into<String>>(mut self, menu_name: S, quantity: i64) -> Self {
        self.items.push(OrderLine::new(menu_name, quantity));
        self
    }

    pub fn with_promo_code<S: Into<String>>(mut self, code: S) -> Self {
        self.promo_code = Some(code.into());
        self
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = note.into();
        self
    }

    /// The promo code, if one was given and it is not blank.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// The result of pricing an order's lines against the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub items: Vec<NewOrderItem>,
    pub subtotal: Money,
}

/// The outcome of a successful order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacement {
    pub order: Order,
    /// The debit entry that paid for the order
    pub ledger_entry: LedgerEntry,
    /// The promo discount that was applied, if any
    pub discount: Option<Discount>,
    /// True if the order's promo code was recorded as used. If a promo was applied but recording its use failed, this
    /// is false and the order still stands. Always false for orders without a promo.
    pub promo_marked: bool,
}

impl OrderPlacement {
    pub fn balance_after(&self) -> Money {
        self.ledger_entry.balance
    }
}
