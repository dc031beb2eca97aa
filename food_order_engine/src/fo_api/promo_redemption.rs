//! Promo redemption: deciding whether a customer may use a promo code, and what it is worth.
//!
//! Redemption is split in two. [`redeem`] only checks and reports the discount. [`mark_used`] records consumption,
//! and must only be called once the order that used the promo has been stored.
use chrono::{DateTime, Utc};
use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    db_types::{Discount, Money, NewPromo, OrderId, Promo, FULL_PERCENTAGE_BP},
    fo_api::errors::PromoError,
    traits::PromoStore,
};

pub const PROMO_CODE_PATTERN: &str = r"^[A-Za-z0-9_-]{3,32}$";

static PROMO_CODE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(PROMO_CODE_PATTERN).expect("Invalid promo code pattern"));

/// The smallest flat discount a promo may offer
pub const MIN_FLAT_DISCOUNT: Money = Money::from_major(10_000);

/// Checks that `customer_id` may use `code` at time `at`, and returns the promo if so.
///
/// Fails with
/// * `PromoNotFound` if there is no such code,
/// * `PromoExpired` if `at` falls outside the promo's start and end dates,
/// * `PromoAlreadyUsed` if the customer has already consumed the code on an earlier order.
pub async fn redeem<P: PromoStore>(
    store: &mut P,
    code: &str,
    customer_id: &str,
    at: DateTime<Utc>,
) -> Result<Promo, PromoError> {
    let promo = store.fetch_promo_by_code(code).await?.ok_or_else(|| PromoError::PromoNotFound(code.to_string()))?;
    if !promo.is_active_at(at) {
        debug!("🎟️ Promo {code} runs from {} to {}. It is not valid at {at}", promo.start_date, promo.end_date);
        return Err(PromoError::PromoExpired(code.to_string()));
    }
    let uses = store.count_promo_uses(customer_id, code).await?;
    if uses > 0 {
        debug!("🎟️ Customer {customer_id} has already used promo {code} on {uses} order(s)");
        return Err(PromoError::PromoAlreadyUsed(code.to_string()));
    }
    trace!("🎟️ Promo {code} ({}) is available to {customer_id}", promo.discount());
    Ok(promo)
}

/// Applies the discount to the subtotal. A discount larger than the subtotal is an error, not a free order.
pub fn apply_discount(subtotal: Money, discount: Discount) -> Result<Money, PromoError> {
    let total = discount.apply(subtotal);
    if total.is_negative() {
        let discount = discount.amount_off(subtotal);
        return Err(PromoError::NegativeTotalAfterDiscount { subtotal, discount });
    }
    Ok(total)
}

/// Records that the promo on the given order has been consumed by the order's customer.
pub async fn mark_used<P: PromoStore>(store: &mut P, order_id: OrderId) -> Result<(), PromoError> {
    store.mark_promo_used(order_id).await?;
    Ok(())
}

/// Checks a new promo before it is stored.
pub fn validate_new_promo(promo: &NewPromo, now: DateTime<Utc>) -> Result<(), PromoError> {
    if !PROMO_CODE_FORMAT.is_match(&promo.promo_code) {
        return Err(PromoError::InvalidPromo(format!(
            "'{}' is not a valid code. Codes are 3 to 32 letters, digits, '-' or '_'",
            promo.promo_code
        )));
    }
    if promo.employee_id.trim().is_empty() {
        return Err(PromoError::InvalidPromo("The issuing employee is required".into()));
    }
    if promo.start_date > promo.end_date {
        return Err(PromoError::InvalidPromo("The start date is after the end date".into()));
    }
    if promo.start_date > now {
        return Err(PromoError::InvalidPromo("The start date is in the future".into()));
    }
    if promo.end_date < now {
        return Err(PromoError::InvalidPromo("The end date is in the past".into()));
    }
    match promo.discount {
        Discount::Percentage(bp) if bp <= 0 => Err(PromoError::InvalidPromo("The discount must be positive".into())),
        Discount::Percentage(bp) if bp >= FULL_PERCENTAGE_BP => {
            Err(PromoError::InvalidPromo("Percentage discounts must be below 100%".into()))
        },
        Discount::Flat(amount) if !amount.is_positive() => {
            Err(PromoError::InvalidPromo("The discount must be positive".into()))
        },
        Discount::Flat(amount) if amount < MIN_FLAT_DISCOUNT => {
            Err(PromoError::InvalidPromo(format!("Flat discounts must be at least {MIN_FLAT_DISCOUNT}")))
        },
        _ => Ok(()),
    }
}
