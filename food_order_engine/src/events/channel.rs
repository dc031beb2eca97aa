//! Simple stateless pub-sub event handler
//!
//! This module provides a simple hook system that lets other parts of the system subscribe to order engine events
//! and react to them. The event handler is stateless, i.e. the handlers have no access to the internal state of the
//! engine. All that is received is the event itself.
//!
//! Handlers can be async. Each event is handled in its own task, so a slow or panicking handler never holds up the
//! engine.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped and all in-flight events have been handled.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Without the internal sender, the channel closes as soon as the last producer is dropped
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move {
                (handler)(ev).await;
            });
        }
        debug!("📬️ Channel closed. Waiting for {} outstanding jobs", jobs.len());
        while let Some(res) = jobs.join_next().await {
            log_job_result(res);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(res: Result<(), tokio::task::JoinError>) {
    match res {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => warn!("📬️ An event handler did not complete: {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test]
    async fn every_published_event_is_handled() {
        let _ = env_logger::try_init();
        let total = Arc::new(AtomicU64::new(0));
        let t2 = total.clone();
        let handler = Arc::new(move |v| {
            let total = total.clone();
            Box::pin(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
                let _ = total.fetch_add(v, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(1, handler);
        let kitchen = event_handler.subscribe();
        let dispatch = event_handler.subscribe();
        tokio::spawn(async move {
            for v in [1, 3, 5, 7, 9] {
                kitchen.publish_event(v).await;
            }
        });
        tokio::spawn(async move {
            for v in [0, 2, 4, 6, 8] {
                dispatch.publish_event(v).await;
            }
        });
        event_handler.start_handler().await;
        assert_eq!(t2.load(Ordering::SeqCst), 45);
    }

    #[tokio::test]
    async fn panicking_handler_does_not_stop_the_loop() {
        let _ = env_logger::try_init();
        let handled = Arc::new(AtomicU64::new(0));
        let h2 = handled.clone();
        let handler = Arc::new(move |v: u64| {
            let handled = handled.clone();
            Box::pin(async move {
                if v == 0 {
                    panic!("handler failure");
                }
                handled.fetch_add(1, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(4, handler);
        let producer = event_handler.subscribe();
        tokio::spawn(async move {
            for v in [1, 0, 2] {
                producer.publish_event(v).await;
            }
        });
        event_handler.start_handler().await;
        assert_eq!(h2.load(Ordering::SeqCst), 2);
    }
}
