use cucumber::World;
use food_order_engine::{
    db_types::Order,
    events::EventProducers,
    FoodOrderDatabase,
    LedgerApi,
    OrderFlowApi,
    OrderFlowError,
    OrderPlacement,
    PromoApi,
    SqliteDatabase,
};
use log::*;

use crate::support::new_database;

#[derive(Default, Debug, World)]
pub struct FoodOrderWorld {
    pub system: Option<OrderSystem>,
    pub last_result: Option<Result<OrderPlacement, OrderFlowError>>,
    /// The most recently placed order
    pub order: Option<Order>,
}

#[derive(Debug)]
pub struct OrderSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub ledger: LedgerApi<SqliteDatabase>,
    pub promos: PromoApi<SqliteDatabase>,
}

impl FoodOrderWorld {
    pub fn system(&self) -> &OrderSystem {
        self.system.as_ref().expect("Order system not initialised")
    }

    pub fn order(&self) -> &Order {
        self.order.as_ref().expect("No order has been placed")
    }

    pub fn record(&mut self, result: Result<OrderPlacement, OrderFlowError>) {
        match &result {
            Ok(placement) => {
                debug!("🥡️ Placed order {}", placement.order.id);
                self.order = Some(placement.order.clone());
            },
            Err(e) => debug!("🥡️ Order rejected. {e}"),
        }
        self.last_result = Some(result);
    }
}

impl OrderSystem {
    pub async fn new() -> Self {
        let db = new_database().await;
        let url = db.url().to_string();
        let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
        let ledger = LedgerApi::new(db.clone());
        let promos = PromoApi::new(db.clone());
        Self { db_path: url, db, orders, ledger, promos }
    }
}

/// The name of the error variant, as used in the feature files.
pub fn error_name(err: &OrderFlowError) -> String {
    let debug = match err {
        OrderFlowError::Pricing(e) => format!("{e:?}"),
        OrderFlowError::Promo(e) => format!("{e:?}"),
        OrderFlowError::Ledger(e) => format!("{e:?}"),
        e => format!("{e:?}"),
    };
    debug.split(|c: char| !c.is_alphanumeric()).next().unwrap_or_default().to_string()
}
