use shopfront_shared::OrderEvent;

/// Destination for events raised by order placement. Publishing is
/// fire-and-forget: a sink must never fail an order that was already recorded.
pub trait OrderEventSink: Send + Sync {
    fn publish(&self, event: OrderEvent);
}
