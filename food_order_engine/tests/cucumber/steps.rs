use std::time::Duration;

use chrono::Utc;
use cucumber::{gherkin::Step, given, then, when};
use food_order_engine::{
    db_types::{Discount, Money, NewPromo, OrderStatusType, TransactionKind},
    Pagination,
    PlaceOrderRequest,
};

use crate::cucumber::{world::error_name, FoodOrderWorld};

#[given(expr = "customer '{word}' has topped up {int}")]
async fn top_up(world: &mut FoodOrderWorld, customer_id: String, amount: i64) {
    let amount = Money::from_major(amount);
    world.system().ledger.top_up(&customer_id, amount, "top up").await.expect("Error topping up");
}

//             promo HEMAT10 gives 10% off
#[given(expr = "promo {word} gives {int}% off")]
async fn percentage_promo(world: &mut FoodOrderWorld, code: String, pct: i64) {
    add_promo(world, code, Discount::percent(pct)).await;
}

#[given(expr = "promo {word} gives {int} off")]
async fn flat_promo(world: &mut FoodOrderWorld, code: String, amount: i64) {
    add_promo(world, code, Discount::Flat(Money::from_major(amount))).await;
}

async fn add_promo(world: &mut FoodOrderWorld, code: String, discount: Discount) {
    let now = Utc::now();
    let (start, end) = (now - chrono::Duration::hours(1), now + chrono::Duration::days(1));
    let promo = NewPromo::new("emp-1".to_string(), code, discount, start, end);
    world.system().promos.create_promo(promo).await.expect("Error creating promo");
}

//             'alice' orders 2 x "Fried Rice"
#[when(expr = "'{word}' orders {int} x {string}")]
async fn order_one(world: &mut FoodOrderWorld, customer_id: String, quantity: i64, item: String) {
    let request = PlaceOrderRequest::new(customer_id, "1 Main Road").with_item(item, quantity);
    place(world, request).await;
}

#[when(expr = "'{word}' orders {int} x {string} with promo code {word}")]
async fn order_one_with_promo(
    world: &mut FoodOrderWorld,
    customer_id: String,
    quantity: i64,
    item: String,
    code: String,
) {
    let request = PlaceOrderRequest::new(customer_id, "1 Main Road").with_item(item, quantity).with_promo_code(code);
    place(world, request).await;
}

#[when(expr = "'{word}' orders the following")]
async fn order_many(world: &mut FoodOrderWorld, customer_id: String, step: &Step) {
    let table = step.table.as_ref().expect("The order needs a table");
    let mut request = PlaceOrderRequest::new(customer_id, "1 Main Road");
    for row in table.rows.iter().skip(1) {
        let quantity = row[1].parse::<i64>().expect("Invalid quantity");
        request = request.with_item(row[0].clone(), quantity);
    }
    place(world, request).await;
}

async fn place(world: &mut FoodOrderWorld, request: PlaceOrderRequest) {
    let result = world.system().orders.place_order(request).await;
    world.record(result);
}

#[when("the order is advanced")]
async fn advance(world: &mut FoodOrderWorld) {
    let id = world.order().id;
    let order = world.system().orders.advance_order_status(id).await.expect("Error advancing order");
    world.order = Some(order);
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut FoodOrderWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then("the order is placed")]
async fn order_placed(world: &mut FoodOrderWorld) {
    match world.last_result.as_ref().expect("No order was attempted") {
        Ok(_) => {},
        Err(e) => panic!("Expected the order to be placed, but it was rejected. {e}"),
    }
}

//             the order is rejected with InsufficientBalance
#[then(expr = "the order is rejected with {word}")]
async fn order_rejected(world: &mut FoodOrderWorld, expected: String) {
    match world.last_result.as_ref().expect("No order was attempted") {
        Ok(p) => panic!("Expected the order to be rejected, but order {} was placed", p.order.id),
        Err(e) => assert_eq!(error_name(e), expected, "Unexpected error: {e}"),
    }
}

#[then(expr = "the order total is {int}")]
async fn order_total(world: &mut FoodOrderWorld, total: i64) {
    assert_eq!(world.order().total_price, Money::from_major(total), "Order total is incorrect");
}

#[then(expr = "the order status is {string}")]
async fn order_status(world: &mut FoodOrderWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Unknown status");
    let id = world.order().id;
    let order = world.system().orders.order_by_id(id).await.expect("Error fetching order").expect("Order is missing");
    assert_eq!(order.status, expected, "Status is incorrect");
}

#[then("advancing the order fails")]
async fn advance_fails(world: &mut FoodOrderWorld) {
    let id = world.order().id;
    let result = world.system().orders.advance_order_status(id).await;
    assert!(result.is_err(), "Expected the status change to be refused");
}

#[then(expr = "the balance of '{word}' is {int}")]
async fn balance_is(world: &mut FoodOrderWorld, customer_id: String, balance: i64) {
    let actual = world.system().ledger.balance(&customer_id).await.expect("Error fetching balance");
    assert_eq!(actual, Money::from_major(balance), "Balance is incorrect");
}

#[then(expr = "'{word}' has {int} ledger entries")]
async fn ledger_entries(world: &mut FoodOrderWorld, customer_id: String, count: i64) {
    let ledger = &world.system().ledger;
    let history = ledger.history(&customer_id, Pagination::default()).await.expect("Error reading ledger");
    assert_eq!(history.paging.total_rows, count, "Ledger entry count is incorrect");
}

#[then(expr = "the last ledger entry for '{word}' is a {word} of {int} described as {string}")]
async fn last_entry(world: &mut FoodOrderWorld, customer_id: String, kind: String, amount: i64, description: String) {
    let audit = world.system().ledger.audit(&customer_id).await.expect("Error auditing ledger");
    assert!(audit.is_consistent(), "Ledger for {customer_id} is inconsistent");
    let history = world
        .system()
        .ledger
        .history(&customer_id, Pagination::new(audit.entries as u32, 1))
        .await
        .expect("Error reading ledger");
    let entry = history.items.first().expect("Ledger is empty");
    assert_eq!(entry.transaction_type, kind.parse::<TransactionKind>().expect("Unknown transaction kind"));
    assert_eq!(entry.amount, Money::from_major(amount), "Amount is incorrect");
    assert_eq!(entry.description, description, "Description is incorrect");
}

#[then(expr = "'{word}' can use promo {word}")]
async fn can_use_promo(world: &mut FoodOrderWorld, customer_id: String, code: String) {
    let result = world.system().promos.check_promo(&code, &customer_id).await;
    assert!(result.is_ok(), "Expected {code} to be available to {customer_id}. {result:?}");
}
