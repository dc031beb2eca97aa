use std::{
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
    },
    time::Duration,
};

use food_order_engine::{
    db_types::{OrderStatusType, TransactionKind},
    events::{EventHandlers, EventHooks},
    PlaceOrderRequest,
};
use futures_util::FutureExt;
use log::*;
use tokio::runtime::Runtime;

mod support;

use support::TestSystem;

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> i32 {
        self.called.load(Ordering::Relaxed)
    }
}

#[test]
fn hooks_fire_after_commit() {
    let rt = Runtime::new().unwrap();
    let placed = HookCalled::default();
    let changed = HookCalled::default();
    let delivered = HookCalled::default();
    let (placed_copy, changed_copy, delivered_copy) = (placed.clone(), changed.clone(), delivered.clone());
    rt.block_on(async move {
        let mut hooks = EventHooks::default();
        hooks
            .on_order_placed(move |ev| {
                info!("🪝️ Order placed: {}", ev.order.id);
                assert_eq!(ev.debit.transaction_type, TransactionKind::Debit);
                assert_eq!(ev.debit.amount, ev.order.total_price);
                placed_copy.called();
                async {}.boxed()
            })
            .on_status_changed(move |ev| {
                info!("🪝️ Order {} moved from {} to {}", ev.order.id, ev.old_status, ev.new_status());
                changed_copy.called();
                if ev.new_status() == OrderStatusType::Delivered {
                    delivered_copy.called();
                }
                async {}.boxed()
            });
        let handlers = EventHandlers::new(10, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;

        let sys = TestSystem::with_producers(producers).await.with_menu(&[("Fried Rice", 15_000)]).await;
        sys.top_up("alice", 50_000).await;
        sys.top_up("bob", 10_000).await;
        let request = PlaceOrderRequest::new("alice", "1 Main Road").with_item("Fried Rice", 1);
        let id = sys.orders.place_order(request).await.expect("Error placing order").order.id;
        // Rejected orders publish nothing
        let request = PlaceOrderRequest::new("bob", "2 Side Street").with_item("Fried Rice", 1);
        assert!(sys.orders.place_order(request).await.is_err());
        sys.orders.advance_order_status(id).await.unwrap();
        sys.orders.advance_order_status(id).await.unwrap();
        assert!(sys.orders.advance_order_status(id).await.is_err());
        // Handlers run on their own tasks
        tokio::time::sleep(Duration::from_millis(250)).await;
        sys.tear_down().await;
    });
    assert_eq!(placed.count(), 1);
    assert_eq!(changed.count(), 2);
    assert_eq!(delivered.count(), 1);
    info!("🪝️ test complete");
}
