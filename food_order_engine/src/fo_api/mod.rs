//! # Food order engine public API
//!
//! The `fo_api` module exposes the programmatic API for the food order engine. The API is modular, so that clients
//! can pick and choose the functionality they want.
//!
//! * [`order_flow_api`] places orders and moves them through their lifecycle. This is the only way orders are created
//!   and the only way a customer's balance is debited.
//! * [`ledger_api`] tops up balances and reads the balance ledger.
//! * [`promo_api`] manages promo codes.
//!
//! The domain rules live in the smaller modules, which work against the storage traits in [`crate::traits`]:
//! [`pricing`], [`promo_redemption`], [`ledger`] and [`order_status`].
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements
//! [`FoodOrderDatabase`](crate::traits::FoodOrderDatabase):
//!
//! ```rust,ignore
//! use food_order_engine::{events::EventProducers, OrderFlowApi, PlaceOrderRequest, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let request = PlaceOrderRequest::new("alice", "1 Main Road").with_item("Fried Rice", 2);
//! let placement = api.place_order(request).await?;
//! ```
pub mod errors;
pub mod ledger;
pub mod ledger_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_status;
pub mod pricing;
pub mod promo_api;
pub mod promo_redemption;
