use cucumber::{gherkin::Step, given};
use food_order_engine::db_types::Money;

use crate::cucumber::{world::OrderSystem, FoodOrderWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut FoodOrderWorld) {
    let system = OrderSystem::new().await;
    world.system = Some(system);
}

#[given("the menu")]
async fn seed_menu(world: &mut FoodOrderWorld, step: &Step) {
    let table = step.table.as_ref().expect("The menu needs a table");
    for row in table.rows.iter().skip(1) {
        let price = row[1].parse::<i64>().expect("Invalid price");
        world.system().db.upsert_menu_item(&row[0], Money::from_major(price)).await.expect("Error adding menu item");
    }
}
