use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::{Customer, CustomerId, CustomerRepository, StoreError, StoreResult};

/// Customer store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        let map = customers.into_iter().map(|c| (c.id, c)).collect();
        Self {
            customers: RwLock::new(map),
        }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let customers = self
            .customers
            .read()
            .map_err(|_| StoreError::backend("customer store lock poisoned"))?;
        Ok(customers.get(&id).cloned())
    }

    async fn create(&self, customer: &Customer) -> StoreResult<()> {
        let mut customers = self
            .customers
            .write()
            .map_err(|_| StoreError::backend("customer store lock poisoned"))?;

        if customers.values().any(|c| c.email == customer.email) {
            return Err(StoreError::Conflict(format!("customer email already registered ({})", customer.email)));
        }
        if customers.contains_key(&customer.id) {
            return Err(StoreError::Conflict(format!("customer {} already exists", customer.id)));
        }

        customers.insert(customer.id, customer.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryCustomerRepository::new();
        let customer = Customer::new("Jane", "jane@example.com").unwrap();

        repo.create(&customer).await.unwrap();

        let found = repo.find_by_id(customer.id).await.unwrap();
        assert_eq!(found, Some(customer));
        assert!(repo.find_by_id(CustomerId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(&Customer::new("Jane", "jane@example.com").unwrap()).await.unwrap();

        let err = repo
            .create(&Customer::new("Other Jane", "JANE@example.com").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
