use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shopfront_catalog::inventory::{self, merge_requests, InventoryError, StockRequest};
use shopfront_catalog::{Product, ProductRepository};
use shopfront_core::{ProductId, StoreError, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the requested rows, plan the adjustment in memory and write it
    /// back, all in one transaction. Rows are locked in id order so two
    /// overlapping batches cannot deadlock. Any early return drops the
    /// transaction, which rolls it back.
    async fn adjust<F>(&self, requests: &[StockRequest], plan: F) -> Result<Vec<Product>, InventoryError>
    where
        F: FnOnce(&[Product], &[StockRequest]) -> Result<Vec<Product>, InventoryError> + Send,
    {
        let requests = merge_requests(requests)?;
        let mut ids: Vec<Uuid> = requests.iter().map(|r| r.product_id.as_uuid()).collect();
        ids.sort();

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, price, quantity, created_at, updated_at FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        let current = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let updated = plan(&current, &requests)?;

        let (update_ids, quantities): (Vec<Uuid>, Vec<i32>) = updated
            .iter()
            .map(|p| (p.id.as_uuid(), p.quantity_on_hand))
            .unzip();

        sqlx::query(
            r#"
            UPDATE products AS p
            SET quantity = v.quantity, updated_at = NOW()
            FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, quantity)
            WHERE p.id = v.id
            "#,
        )
        .bind(&update_ids)
        .bind(&quantities)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(updated)
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        if row.quantity < 0 {
            return Err(StoreError::Corrupt(format!("product {} has negative stock {}", row.id, row.quantity)));
        }

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            unit_price: row.price,
            quantity_on_hand: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let ids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();

        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, price, quantity, created_at, updated_at FROM products WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, price, quantity, created_at, updated_at FROM products WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(Product::try_from).transpose()
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.unit_price)
        .bind(product.quantity_on_hand)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn save(&self, products: &[Product]) -> StoreResult<()> {
        if let Some(bad) = products.iter().find(|p| p.quantity_on_hand < 0) {
            return Err(StoreError::Corrupt(format!(
                "product {} would have negative stock {}",
                bad.id, bad.quantity_on_hand
            )));
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, price, quantity, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, price = EXCLUDED.price, quantity = EXCLUDED.quantity, updated_at = NOW()
                "#,
            )
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(product.unit_price)
            .bind(product.quantity_on_hand)
            .bind(product.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn decrement_quantities(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
        self.adjust(requests, inventory::plan_decrement).await
    }

    async fn restock(&self, requests: &[StockRequest]) -> Result<Vec<Product>, InventoryError> {
        self.adjust(requests, inventory::plan_restock).await
    }
}
