use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shopfront_core::{Customer, CustomerId, OrderId, ProductId, StoreResult};
use shopfront_order::{Order, OrderLineItem, OrderRepository};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::db_err;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<OrderLineItem>>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, price, quantity FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut items: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
        for row in rows {
            items.entry(row.order_id).or_default().push(OrderLineItem {
                product_id: ProductId::from_uuid(row.product_id),
                unit_price: row.price,
                quantity: row.quantity,
            });
        }
        Ok(items)
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    price: Decimal,
    quantity: i32,
}

fn into_order(row: OrderRow, items: &mut HashMap<Uuid, Vec<OrderLineItem>>) -> Order {
    Order {
        id: OrderId::from_uuid(row.id),
        customer_id: CustomerId::from_uuid(row.customer_id),
        line_items: items.remove(&row.id).unwrap_or_default(),
        created_at: row.created_at,
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, customer: &Customer, line_items: Vec<OrderLineItem>) -> StoreResult<Order> {
        let order_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row: OrderRow = sqlx::query_as(
            "INSERT INTO orders (id, customer_id) VALUES ($1, $2) RETURNING id, customer_id, created_at",
        )
        .bind(order_id)
        .bind(customer.id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        for (position, item) in line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(position as i32)
            .bind(item.product_id.as_uuid())
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        let mut items = HashMap::from([(order_id, line_items)]);
        Ok(into_order(row, &mut items))
    }

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT id, customer_id, created_at FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => {
                let mut items = self.load_items(&[row.id]).await?;
                Ok(Some(into_order(row, &mut items)))
            }
            None => Ok(None),
        }
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, customer_id, created_at FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        Ok(rows.into_iter().map(|row| into_order(row, &mut items)).collect())
    }
}
