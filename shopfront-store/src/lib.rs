pub mod app_config;
pub mod database;
pub mod events;
pub mod product_repo;
pub mod customer_repo;
pub mod order_repo;

pub use database::DbClient;
pub use events::EventBus;
pub use product_repo::PgProductRepository;
pub use customer_repo::PgCustomerRepository;
pub use order_repo::PgOrderRepository;
