pub mod ids;
pub mod money;
pub mod customer;
pub mod repository;
pub mod memory;

pub use ids::{CustomerId, OrderId, ProductId};
pub use customer::Customer;
pub use repository::CustomerRepository;
pub use memory::InMemoryCustomerRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure raised by a storage backend behind one of the repository traits.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Stored record violates an invariant: {0}")]
    Corrupt(String),

    #[error("Record already exists: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
