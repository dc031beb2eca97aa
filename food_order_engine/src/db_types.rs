use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use food_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle of an order. Orders only ever move forward: `Preparing` → `OutForDelivery` → `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been paid for and the kitchen is working on it.
    #[serde(rename = "preparing")]
    Preparing,
    /// The order has left the kitchen.
    #[serde(rename = "out for delivery")]
    OutForDelivery,
    /// The order has reached the customer. This is a terminal state.
    #[serde(rename = "delivered")]
    Delivered,
}

impl OrderStatusType {
    /// The only status an order may move to from this one, or `None` if this status is terminal.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out for delivery",
            Self::Delivered => "delivered",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparing" => Ok(Self::Preparing),
            "out for delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl TryFrom<String> for OrderStatusType {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|e| {
            error!("🗃️ Found an unknown order status in the database: {value}");
            e
        })
    }
}

//--------------------------------------        OrderItem       --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub menu_id: i64,
    pub menu_name: String,
    pub quantity: i64,
    /// The menu price at the time the order was placed
    pub unit_price: Money,
}

//--------------------------------------          Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: String,
    pub address: String,
    pub promo_code: Option<String>,
    /// True once the promo code on this order has been recorded as consumed by the customer
    pub promo_used: bool,
    #[sqlx(try_from = "String")]
    pub status: OrderStatusType,
    pub note: String,
    pub date: DateTime<Utc>,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// A priced line item, ready to be stored with its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub menu_id: i64,
    pub menu_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewOrderItem {
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: String,
    pub address: String,
    pub promo_code: Option<String>,
    pub status: OrderStatusType,
    pub note: String,
    /// The time the order was placed
    pub date: DateTime<Utc>,
    /// The amount charged for the order, after any discount
    pub total_price: Money,
    pub items: Vec<NewOrderItem>,
}

//--------------------------------------    TransactionKind    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Applies an amount of this kind to a running balance. Returns `None` on overflow.
    pub fn apply(&self, balance: Money, amount: Money) -> Option<Money> {
        match self {
            Self::Credit => balance.checked_add(amount),
            Self::Debit => balance.checked_sub(amount),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            s => Err(ConversionError(format!("Invalid transaction type: {s}"))),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------      LedgerEntry      ---------------------------------------------------------
/// One immutable row of the balance ledger. `balance` is the customer's balance after this entry was applied.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub customer_id: String,
    #[sqlx(try_from = "String")]
    pub transaction_type: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub customer_id: String,
    pub transaction_type: TransactionKind,
    pub amount: Money,
    pub description: String,
    /// The resulting balance after this entry
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Discount       ---------------------------------------------------------
/// The number of basis points in 100%.
pub const FULL_PERCENTAGE_BP: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discount {
    /// A percentage of the subtotal, in basis points (1/100th of a percent)
    Percentage(i64),
    /// A fixed amount off the subtotal
    Flat(Money),
}

impl Discount {
    /// Whole-number percentage, e.g. `Discount::percent(10)` is 10% off.
    pub fn percent(pct: i64) -> Self {
        Self::Percentage(pct * 100)
    }

    /// The amount this discount takes off the given subtotal. Percentage discounts truncate toward zero.
    pub fn amount_off(&self, subtotal: Money) -> Money {
        match self {
            Self::Percentage(bp) => {
                let off = i128::from(subtotal.value()) * i128::from(*bp) / i128::from(FULL_PERCENTAGE_BP);
                Money::from(i64::try_from(off).unwrap_or(i64::MAX))
            },
            Self::Flat(amount) => *amount,
        }
    }

    /// Applies the discount. The result may be negative; callers decide whether that is acceptable.
    pub fn apply(&self, subtotal: Money) -> Money {
        subtotal - self.amount_off(subtotal)
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, Self::Percentage(_))
    }

    /// The raw stored value: basis points for percentages, minor units for flat amounts
    pub fn raw_value(&self) -> i64 {
        match self {
            Self::Percentage(bp) => *bp,
            Self::Flat(amount) => amount.value(),
        }
    }
}

impl Display for Discount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage(bp) => write!(f, "{}.{:02}%", bp / 100, bp % 100),
            Self::Flat(amount) => write!(f, "{amount} off"),
        }
    }
}

//--------------------------------------          Promo        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Promo {
    pub id: i64,
    /// The employee that issued the promo
    pub employee_id: String,
    pub promo_code: String,
    /// Basis points when `is_percentage` is set, otherwise minor currency units
    pub discount: i64,
    pub is_percentage: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promo {
    pub fn discount(&self) -> Discount {
        if self.is_percentage {
            Discount::Percentage(self.discount)
        } else {
            Discount::Flat(Money::from(self.discount))
        }
    }

    /// True if `at` lies within the promo's active window, boundaries included.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPromo {
    pub employee_id: String,
    pub promo_code: String,
    pub discount: Discount,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: String,
}

impl NewPromo {
    pub fn new<S: Into<String>>(
        employee_id: S,
        promo_code: S,
        discount: Discount,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            promo_code: promo_code.into(),
            discount,
            start_date,
            end_date,
            description: String::default(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }
}

//--------------------------------------        MenuItem       ---------------------------------------------------------
/// The subset of a menu entry the order engine needs. Menus are maintained elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: Money,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_progression() {
        use OrderStatusType::*;
        assert_eq!(Preparing.next(), Some(OutForDelivery));
        assert_eq!(OutForDelivery.next(), Some(Delivered));
        assert_eq!(Delivered.next(), None);
        assert!(Preparing.is_active() && OutForDelivery.is_active() && !Delivered.is_active());
    }

    #[test]
    fn status_strings() {
        for s in [OrderStatusType::Preparing, OrderStatusType::OutForDelivery, OrderStatusType::Delivered] {
            assert_eq!(s.to_string().parse::<OrderStatusType>().unwrap(), s);
        }
        assert!("cancelled".parse::<OrderStatusType>().is_err());
        assert_eq!(OrderStatusType::OutForDelivery.to_string(), "out for delivery");
    }

    #[test]
    fn line_totals_are_checked() {
        let item = |quantity, unit_price| NewOrderItem { menu_id: 1, menu_name: "Satay".into(), quantity, unit_price };
        assert_eq!(item(3, Money::from_major(25_000)).line_total(), Some(Money::from_major(75_000)));
        assert_eq!(item(2, Money::from(i64::MAX / 2 + 1)).line_total(), None);
        assert_eq!(item(i64::MAX, Money::from(-2)).line_total(), None);
    }

    #[test]
    fn percentage_discount() {
        let subtotal = Money::from_major(25_000);
        let promo = Discount::percent(10);
        assert_eq!(promo.amount_off(subtotal), Money::from_major(2_500));
        assert_eq!(promo.apply(subtotal), Money::from_major(22_500));
        // 12.5% of 0.99 is 0.12375, truncated to 0.12
        assert_eq!(Discount::Percentage(1_250).amount_off(Money::from(99)), Money::from(12));
    }

    #[test]
    fn flat_discount() {
        let flat = Discount::Flat(Money::from_major(10_000));
        assert_eq!(flat.apply(Money::from_major(25_000)), Money::from_major(15_000));
        assert!(flat.apply(Money::from_major(5_000)).is_negative());
        assert_eq!(flat.to_string(), "10000.00 off");
        assert_eq!(Discount::Percentage(1_050).to_string(), "10.50%");
    }

    #[test]
    fn ledger_kinds() {
        let b = Money::from_major(100);
        assert_eq!(TransactionKind::Credit.apply(b, Money::from_major(20)), Some(Money::from_major(120)));
        assert_eq!(TransactionKind::Debit.apply(b, Money::from_major(120)), Some(Money::from_major(-20)));
        assert_eq!("debit".parse::<TransactionKind>().unwrap(), TransactionKind::Debit);
        assert!("refund".parse::<TransactionKind>().is_err());
    }
}
