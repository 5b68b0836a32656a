use shopfront_order::OrderEventSink;
use shopfront_shared::OrderEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// In-process fan-out of order events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl OrderEventSink for EventBus {
    fn publish(&self, event: OrderEvent) {
        let topic = event.topic();
        match self.tx.send(event) {
            Ok(receivers) => debug!(topic, receivers, "Event published"),
            Err(_) => debug!(topic, "Event dropped, no subscribers"),
        }
    }
}
