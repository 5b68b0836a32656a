use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopfront_core::{Customer, CustomerId, CustomerRepository, StoreResult};
use shopfront_shared::Masked;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::from_uuid(row.id),
            name: row.name,
            email: Masked::new(row.email),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT id, name, email, created_at FROM customers WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(Customer::from))
    }

    async fn create(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query("INSERT INTO customers (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(customer.id.as_uuid())
            .bind(&customer.name)
            .bind(customer.email.expose())
            .bind(customer.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}
