use thiserror::Error;

use crate::{
    db_types::{Money, OrderId, OrderStatusType},
    traits::StorageError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Menu item '{0}' does not exist")]
    MenuNotFound(String),
    #[error("Quantity {quantity} for '{menu}' is invalid. Quantities must be positive")]
    InvalidQuantity { menu: String, quantity: i64 },
    #[error("Menu item '{0}' has no price")]
    InvalidPrice(String),
    #[error("The order total is too large to represent")]
    PriceOverflow,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StorageError> for PricingError {
    fn from(e: StorageError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("Promo code '{0}' does not exist")]
    PromoNotFound(String),
    #[error("Promo code '{0}' is not active")]
    PromoExpired(String),
    #[error("Promo code '{0}' has already been used")]
    PromoAlreadyUsed(String),
    #[error("The discount of {discount} exceeds the subtotal of {subtotal}")]
    NegativeTotalAfterDiscount { subtotal: Money, discount: Money },
    #[error("Invalid promo: {0}")]
    InvalidPromo(String),
    #[error("Promo code '{0}' already exists")]
    PromoAlreadyExists(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StorageError> for PromoError {
    fn from(e: StorageError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Could not read the ledger: {0}")]
    LedgerReadError(String),
    #[error("Could not write to the ledger: {0}")]
    LedgerWriteError(String),
    #[error("Ledger amounts must be positive, but {0} was given")]
    InvalidAmount(Money),
    #[error("Ledger entries require a description")]
    MissingDescription,
    #[error("Top-ups must be at least {minimum}, but {amount} was given")]
    BelowMinimumTopUp { amount: Money, minimum: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Promo(#[from] PromoError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Customer {0} already has an order that has not been delivered")]
    UnfinishedOrderExists(String),
    #[error("Order validation failed: {0}")]
    ValidationFailed(String),
    #[error("Insufficient balance. The order costs {total}, but the balance is only {balance}")]
    InsufficientBalance { total: Money, balance: Money },
    #[error("Could not save the order: {0}")]
    OrderPersistFailed(String),
    #[error("An order cannot move on from '{0}'")]
    InvalidStatusTransition(OrderStatusType),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StorageError> for OrderFlowError {
    fn from(e: StorageError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
