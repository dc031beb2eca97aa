//! Order pricing: resolves each order line against the menu and totals the result.
use log::*;

use crate::{
    db_types::{Money, NewOrderItem},
    fo_api::{
        errors::PricingError,
        order_objects::{OrderLine, PricedOrder},
    },
    traits::MenuLookup,
};

/// Prices every line of an order at the current menu price.
///
/// Lines are checked in order. The first line whose menu item does not exist, has no price, or has a non-positive
/// quantity fails the whole order.
pub async fn price_order<M: MenuLookup>(menu: &mut M, lines: &[OrderLine]) -> Result<PricedOrder, PricingError> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = menu.fetch_menu_item(&line.menu_name).await?.ok_or_else(|| {
            debug!("🧾️ Menu item '{}' does not exist", line.menu_name);
            PricingError::MenuNotFound(line.menu_name.clone())
        })?;
        if item.price == Money::zero() {
            warn!("🧾️ Menu item '{}' (#{}) has a price of zero", item.name, item.id);
            return Err(PricingError::InvalidPrice(item.name));
        }
        if line.quantity <= 0 {
            return Err(PricingError::InvalidQuantity { menu: item.name, quantity: line.quantity });
        }
        items.push(NewOrderItem {
            menu_id: item.id,
            menu_name: item.name,
            quantity: line.quantity,
            unit_price: item.price,
        });
    }
    let subtotal = subtotal(&items)?;
    trace!("🧾️ {} lines priced at {subtotal}", items.len());
    Ok(PricedOrder { items, subtotal })
}

/// The sum of unit price × quantity over all items.
pub fn subtotal(items: &[NewOrderItem]) -> Result<Money, PricingError> {
    items.iter().try_fold(Money::zero(), |acc, item| {
        item.line_total().and_then(|t| acc.checked_add(t)).ok_or(PricingError::PriceOverflow)
    })
}
