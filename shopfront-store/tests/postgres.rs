//! Runs against a real database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use rust_decimal::Decimal;
use shopfront_catalog::{Product, ProductRepository};
use shopfront_core::{Customer, CustomerRepository};
use shopfront_order::{OrderError, OrderService, PlaceOrderRequest};
use shopfront_store::app_config::DatabaseConfig;
use shopfront_store::{DbClient, PgCustomerRepository, PgOrderRepository, PgProductRepository};
use std::str::FromStr;
use std::sync::Arc;

async fn connect() -> DbClient {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let db = DbClient::new(&DatabaseConfig {
        url,
        max_connections: 20,
        acquire_timeout_seconds: 10,
        run_migrations: true,
    })
    .await
    .expect("connect");
    db.migrate().await.expect("migrate");
    db
}

fn unique(name: &str) -> String {
    format!("{}-{}", name, uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_place_order_round_trip() {
    let db = connect().await;
    let products = Arc::new(PgProductRepository::new(db.pool.clone()));
    let customers = Arc::new(PgCustomerRepository::new(db.pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));

    let customer = Customer::new("C1", format!("{}@example.com", uuid::Uuid::new_v4())).unwrap();
    customers.create(&customer).await.unwrap();

    let a = Product::new(unique("A"), Decimal::from_str("9.99").unwrap(), 10).unwrap();
    let b = Product::new(unique("B"), Decimal::from_str("4.50").unwrap(), 3).unwrap();
    products.create(&a).await.unwrap();
    products.create(&b).await.unwrap();

    let service = OrderService::new(products.clone(), customers, orders);
    let order = service
        .place_order(PlaceOrderRequest::new(customer.id).item(a.id, 2).item(b.id, 3))
        .await
        .unwrap();

    let stored = service.find_order(order.id).await.unwrap();
    assert_eq!(stored.line_items, order.line_items);
    assert_eq!(stored.total().unwrap().to_string(), "33.48");

    let after = products.find_by_ids(&[a.id, b.id]).await.unwrap();
    let qty = |id| after.iter().find(|p| p.id == id).unwrap().quantity_on_hand;
    assert_eq!(qty(a.id), 8);
    assert_eq!(qty(b.id), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_orders_do_not_oversell() {
    let db = connect().await;
    let products = Arc::new(PgProductRepository::new(db.pool.clone()));
    let customers = Arc::new(PgCustomerRepository::new(db.pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));

    let customer = Customer::new("Racer", format!("{}@example.com", uuid::Uuid::new_v4())).unwrap();
    customers.create(&customer).await.unwrap();
    let item = Product::new(unique("Scarce"), Decimal::ONE, 4).unwrap();
    products.create(&item).await.unwrap();

    let service = OrderService::new(products.clone(), customers, orders);
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            let request = PlaceOrderRequest::new(customer.id).item(item.id, 1);
            tokio::spawn(async move { service.place_order(request).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(OrderError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 4);
    let after = products.find_by_ids(&[item.id]).await.unwrap();
    assert_eq!(after[0].quantity_on_hand, 0);
}
