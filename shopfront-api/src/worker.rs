use shopfront_shared::OrderEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub orders_seen: u64,
    pub low_stock_alerts: u64,
    pub lagged: u64,
}

/// Consume order events until the bus closes: log placed orders and warn
/// when a product falls to `low_stock_threshold` or below.
pub async fn run_event_worker(mut rx: broadcast::Receiver<OrderEvent>, low_stock_threshold: i32) -> WorkerStats {
    let mut stats = WorkerStats::default();
    info!(low_stock_threshold, "Event worker started, listening to orders...");

    loop {
        match rx.recv().await {
            Ok(OrderEvent::OrderPlaced(event)) => {
                stats.orders_seen += 1;
                info!(
                    order_id = %event.order_id,
                    customer_id = %event.customer_id,
                    lines = event.line_count,
                    units = event.total_quantity,
                    total = %event.total,
                    "Order placed"
                );
            }
            Ok(OrderEvent::StockLevel(event)) => {
                if event.quantity_on_hand <= low_stock_threshold {
                    stats.low_stock_alerts += 1;
                    warn!(
                        product_id = %event.product_id,
                        product = %event.product_name,
                        remaining = event.quantity_on_hand,
                        "Low stock"
                    );
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                stats.lagged += skipped;
                warn!(skipped, "Event worker lagging, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!(?stats, "Event worker stopped");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopfront_shared::{OrderPlacedEvent, StockLevelEvent};
    use uuid::Uuid;

    fn stock(quantity_on_hand: i32) -> OrderEvent {
        OrderEvent::StockLevel(StockLevelEvent {
            product_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            quantity_on_hand,
            timestamp: 0,
        })
    }

    #[tokio::test]
    async fn test_worker_counts_orders_and_low_stock() {
        let (tx, rx) = broadcast::channel(16);
        let worker = tokio::spawn(run_event_worker(rx, 5));

        tx.send(OrderEvent::OrderPlaced(OrderPlacedEvent {
            order_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            line_count: 1,
            total_quantity: 3,
            total: Decimal::new(300, 2),
            timestamp: 0,
        }))
        .unwrap();
        tx.send(stock(20)).unwrap();
        tx.send(stock(5)).unwrap();
        tx.send(stock(0)).unwrap();
        drop(tx);

        let stats = worker.await.unwrap();
        assert_eq!(stats.orders_seen, 1);
        assert_eq!(stats.low_stock_alerts, 2);
        assert_eq!(stats.lagged, 0);
    }
}
