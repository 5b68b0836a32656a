use chrono::Utc;
use rust_decimal::Decimal;
use shopfront_catalog::inventory::{merge_requests, missing_products};
use shopfront_catalog::{Product, ProductRepository, StockRequest};
use shopfront_core::{Customer, CustomerId, CustomerRepository, OrderId, ProductId, StoreError};
use shopfront_shared::{OrderEvent, OrderPlacedEvent, StockLevelEvent};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::OrderError;
use crate::events::OrderEventSink;
use crate::models::{total_of, Order, OrderLineItem, PlaceOrderRequest};
use crate::repository::OrderRepository;

/// Places orders: validates the request against the customer and product
/// stores, takes the stock and records the order.
#[derive(Clone)]
pub struct OrderService {
    products: Arc<dyn ProductRepository>,
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    events: Option<Arc<dyn OrderEventSink>>,
}

impl OrderService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            products,
            customers,
            orders,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn OrderEventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Place an order. Every failure leaves stock and orders as they were.
    ///
    /// The customer is resolved before anything is touched, so an unknown
    /// customer can never consume stock. Product existence is checked with one
    /// batched lookup and all missing ids are reported together.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, OrderError> {
        let requests = validate_request(&request)?;

        // 1. Customer
        let customer = self
            .customers
            .find_by_id(request.customer_id)
            .await?
            .ok_or(OrderError::CustomerNotFound(request.customer_id))?;

        // 2. Products, one batched lookup
        let ids: Vec<ProductId> = requests.iter().map(|r| r.product_id).collect();
        let found = self.products.find_by_ids(&ids).await?;

        // 3. Existence, before any stock moves
        let missing = missing_products(&found, &requests);
        if !missing.is_empty() {
            warn!(customer_id = %customer.id, missing = missing.len(), "Order rejected: unknown products");
            return Err(OrderError::InvalidProduct(missing));
        }

        // 4-6 run on their own task: once stock is taken, dropping the caller's
        // future must not stop the order from being recorded or compensated.
        let this = self.clone();
        tokio::spawn(async move { this.commit(customer, requests).await })
            .await
            .map_err(|e| OrderError::Store(StoreError::backend(e)))?
    }

    pub async fn find_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    pub async fn list_customer_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        if self.customers.find_by_id(customer_id).await?.is_none() {
            return Err(OrderError::CustomerNotFound(customer_id));
        }
        Ok(self.orders.list_by_customer(customer_id).await?)
    }

    async fn commit(&self, customer: Customer, requests: Vec<StockRequest>) -> Result<Order, OrderError> {
        // 4. Take stock for the whole batch atomically
        let updated = match self.products.decrement_quantities(&requests).await {
            Ok(updated) => updated,
            Err(e) => {
                let err = OrderError::from(e);
                warn!(customer_id = %customer.id, error = %err, "Order rejected: stock not taken");
                return Err(err);
            }
        };

        // 5. Snapshot prices from the records the decrement locked
        let line_items = build_line_items(&updated, &requests);
        let Some(total) = total_of(&line_items) else {
            warn!(customer_id = %customer.id, "Order rejected: total out of range, restocking");
            self.compensate(&requests).await;
            return Err(OrderError::Validation("order total is out of range".to_string()));
        };

        // 6. Record the order, handing stock back if that fails
        let order = match self.orders.create(&customer, line_items).await {
            Ok(order) => order,
            Err(e) => {
                error!(customer_id = %customer.id, error = %e, "Order could not be recorded, restocking");
                self.compensate(&requests).await;
                return Err(e.into());
            }
        };

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            lines = order.line_items.len(),
            total = %total,
            "Order placed"
        );

        self.publish(&order, total, &updated);
        Ok(order)
    }

    async fn compensate(&self, requests: &[StockRequest]) {
        if let Err(e) = self.products.restock(requests).await {
            error!(error = %e, "Restock after failed order failed; stock must be reconciled manually");
        }
    }

    fn publish(&self, order: &Order, total: Decimal, updated: &[Product]) {
        let Some(events) = &self.events else {
            return;
        };

        let timestamp = Utc::now().timestamp();
        events.publish(OrderEvent::OrderPlaced(OrderPlacedEvent {
            order_id: order.id.as_uuid(),
            customer_id: order.customer_id.as_uuid(),
            line_count: order.line_items.len(),
            total_quantity: order.total_quantity(),
            total,
            timestamp,
        }));

        for product in updated {
            events.publish(OrderEvent::StockLevel(StockLevelEvent {
                product_id: product.id.as_uuid(),
                product_name: product.name.clone(),
                quantity_on_hand: product.quantity_on_hand,
                timestamp,
            }));
        }
    }
}

/// Reject malformed requests before any store is consulted and merge repeated
/// product ids.
fn validate_request(request: &PlaceOrderRequest) -> Result<Vec<StockRequest>, OrderError> {
    if request.customer_id.is_empty() {
        return Err(OrderError::Validation("customer_id is required".to_string()));
    }
    if request.items.is_empty() {
        return Err(OrderError::Validation("an order needs at least one item".to_string()));
    }

    let mut requests = Vec::with_capacity(request.items.len());
    for item in &request.items {
        if item.product_id.is_empty() {
            return Err(OrderError::Validation("product_id is required".to_string()));
        }
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity for product {} must be positive, got {}",
                item.product_id, item.quantity
            )));
        }
        requests.push(StockRequest::new(item.product_id, item.quantity));
    }

    Ok(merge_requests(&requests)?)
}

fn build_line_items(products: &[Product], requests: &[StockRequest]) -> Vec<OrderLineItem> {
    requests
        .iter()
        .filter_map(|request| {
            products
                .iter()
                .find(|p| p.id == request.product_id)
                .map(|product| OrderLineItem {
                    product_id: product.id,
                    unit_price: product.unit_price,
                    quantity: request.quantity,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryOrderRepository;
    use async_trait::async_trait;
    use shopfront_catalog::InMemoryProductRepository;
    use shopfront_core::money::MAX_PRICE;
    use shopfront_core::{InMemoryCustomerRepository, StoreResult};
    use std::str::FromStr;
    use std::sync::Mutex;

    struct Fixture {
        service: OrderService,
        products: Arc<InMemoryProductRepository>,
        orders: Arc<InMemoryOrderRepository>,
        customer: Customer,
        a: Product,
        b: Product,
    }

    fn product(name: &str, price: &str, quantity: i32) -> Product {
        Product::new(name, Decimal::from_str(price).unwrap(), quantity).unwrap()
    }

    fn fixture() -> Fixture {
        let customer = Customer::new("C1", "c1@example.com").unwrap();
        let a = product("A", "9.99", 10);
        let b = product("B", "4.50", 3);

        let products = Arc::new(InMemoryProductRepository::with_products([a.clone(), b.clone()]));
        let customers = Arc::new(InMemoryCustomerRepository::with_customers([customer.clone()]));
        let orders = Arc::new(InMemoryOrderRepository::new());

        Fixture {
            service: OrderService::new(products.clone(), customers, orders.clone()),
            products,
            orders,
            customer,
            a,
            b,
        }
    }

    #[tokio::test]
    async fn test_place_order_example() {
        let f = fixture();
        let request = PlaceOrderRequest::new(f.customer.id).item(f.a.id, 2).item(f.b.id, 3);

        let order = f.service.place_order(request).await.unwrap();

        assert_eq!(order.customer_id, f.customer.id);
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].product_id, f.a.id);
        assert_eq!(order.line_items[0].unit_price.to_string(), "9.99");
        assert_eq!(order.line_items[0].quantity, 2);
        assert_eq!(order.line_items[1].unit_price.to_string(), "4.50");
        assert_eq!(order.line_items[1].quantity, 3);

        assert_eq!(f.products.quantity_of(&f.a.id), Some(8));
        assert_eq!(f.products.quantity_of(&f.b.id), Some(0));
        assert_eq!(f.products.total_on_hand(), 13 - 5);

        let stored = f.service.find_order(order.id).await.unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_unknown_products_are_all_reported() {
        let f = fixture();
        let ghost_1 = ProductId::new();
        let ghost_2 = ProductId::new();
        let request = PlaceOrderRequest::new(f.customer.id)
            .item(ghost_1, 1)
            .item(f.a.id, 1)
            .item(ghost_2, 1);

        let err = f.service.place_order(request).await.unwrap_err();

        assert!(matches!(err, OrderError::InvalidProduct(ref ids) if *ids == vec![ghost_1, ghost_2]));
        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
        assert!(f.orders.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_touches_nothing() {
        let f = fixture();
        let request = PlaceOrderRequest::new(f.customer.id).item(f.a.id, 1).item(f.b.id, 5);

        let err = f.service.place_order(request).await.unwrap_err();

        match err {
            OrderError::InsufficientStock { product_id, requested, available } => {
                assert_eq!(product_id, f.b.id);
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
        assert_eq!(f.products.quantity_of(&f.b.id), Some(3));
        assert!(f.orders.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_customer_consumes_no_stock() {
        let f = fixture();
        let stranger = CustomerId::new();
        let request = PlaceOrderRequest::new(stranger).item(f.a.id, 2);

        let err = f.service.place_order(request).await.unwrap_err();

        assert!(matches!(err, OrderError::CustomerNotFound(id) if id == stranger));
        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
        assert!(f.orders.is_empty());
    }

    #[tokio::test]
    async fn test_place_order_is_not_idempotent() {
        let f = fixture();
        let request = PlaceOrderRequest::new(f.customer.id).item(f.a.id, 2);

        let first = f.service.place_order(request.clone()).await.unwrap();
        let second = f.service.place_order(request).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(f.products.quantity_of(&f.a.id), Some(6));
        assert_eq!(f.orders.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_items_are_merged() {
        let f = fixture();
        let request = PlaceOrderRequest::new(f.customer.id)
            .item(f.a.id, 1)
            .item(f.b.id, 1)
            .item(f.a.id, 2);

        let order = f.service.place_order(request).await.unwrap();

        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].product_id, f.a.id);
        assert_eq!(order.line_items[0].quantity, 3);
        assert_eq!(f.products.quantity_of(&f.a.id), Some(7));
    }

    #[tokio::test]
    async fn test_malformed_requests_rejected() {
        let f = fixture();

        let empty = PlaceOrderRequest::new(f.customer.id);
        assert!(matches!(f.service.place_order(empty).await, Err(OrderError::Validation(_))));

        let zero = PlaceOrderRequest::new(f.customer.id).item(f.a.id, 0);
        assert!(matches!(f.service.place_order(zero).await, Err(OrderError::Validation(_))));

        let negative = PlaceOrderRequest::new(f.customer.id).item(f.a.id, -4);
        assert!(matches!(f.service.place_order(negative).await, Err(OrderError::Validation(_))));

        let nil_customer = PlaceOrderRequest::new(CustomerId::from_uuid(uuid::Uuid::nil())).item(f.a.id, 1);
        assert!(matches!(f.service.place_order(nil_customer).await, Err(OrderError::Validation(_))));

        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_price_change() {
        let f = fixture();
        let order = f
            .service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(f.a.id, 1))
            .await
            .unwrap();

        let mut repriced = f.products.find_by_ids(&[f.a.id]).await.unwrap().remove(0);
        repriced.unit_price = Decimal::from_str("19.99").unwrap();
        f.products.save(&[repriced]).await.unwrap();

        let stored = f.service.find_order(order.id).await.unwrap();
        assert_eq!(stored.line_items[0].unit_price.to_string(), "9.99");
    }

    #[tokio::test]
    async fn test_order_total_overflow_restocks() {
        let f = fixture();
        let mut runaway = f.products.find_by_ids(&[f.a.id]).await.unwrap().remove(0);
        runaway.unit_price = Decimal::MAX;
        f.products.save(&[runaway]).await.unwrap();

        let err = f
            .service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(f.a.id, 2).item(f.b.id, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
        assert_eq!(f.products.quantity_of(&f.b.id), Some(3));
        assert!(f.orders.is_empty());
    }

    #[tokio::test]
    async fn test_order_at_price_ceiling() {
        let f = fixture();
        let dear = Product::new("Dear", MAX_PRICE, 1_000_000).unwrap();
        f.products.create(&dear).await.unwrap();

        let order = f
            .service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(dear.id, 1_000_000))
            .await
            .unwrap();

        assert_eq!(order.total(), Some(MAX_PRICE * Decimal::from(1_000_000)));
        assert_eq!(f.products.quantity_of(&dear.id), Some(0));
    }

    #[tokio::test]
    async fn test_find_missing_order() {
        let f = fixture();
        let id = OrderId::new();
        assert!(matches!(f.service.find_order(id).await, Err(OrderError::OrderNotFound(missing)) if missing == id));
    }

    struct FailingOrderRepository;

    #[async_trait]
    impl OrderRepository for FailingOrderRepository {
        async fn create(&self, _customer: &Customer, _line_items: Vec<OrderLineItem>) -> StoreResult<Order> {
            Err(StoreError::backend("orders table unavailable"))
        }

        async fn find_by_id(&self, _id: OrderId) -> StoreResult<Option<Order>> {
            Ok(None)
        }

        async fn list_by_customer(&self, _customer_id: CustomerId) -> StoreResult<Vec<Order>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_order_write_restocks() {
        let f = fixture();
        let customers = Arc::new(InMemoryCustomerRepository::with_customers([f.customer.clone()]));
        let service = OrderService::new(f.products.clone(), customers, Arc::new(FailingOrderRepository));

        let err = service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(f.a.id, 4).item(f.b.id, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Store(_)));
        assert_eq!(f.products.quantity_of(&f.a.id), Some(10));
        assert_eq!(f.products.quantity_of(&f.b.id), Some(3));
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<OrderEvent>>,
    }

    impl OrderEventSink for RecordingSink {
        fn publish(&self, event: OrderEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_events_published_on_success_only() {
        let f = fixture();
        let sink = Arc::new(RecordingSink::default());
        let service = f.service.clone().with_events(sink.clone());

        let order = service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(f.b.id, 3))
            .await
            .unwrap();
        let _ = service
            .place_order(PlaceOrderRequest::new(f.customer.id).item(f.b.id, 1))
            .await
            .unwrap_err();

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], OrderEvent::OrderPlaced(e) if e.order_id == order.id.as_uuid()));
        assert!(matches!(&events[1], OrderEvent::StockLevel(e) if e.quantity_on_hand == 0));
    }
}
