pub mod product;
pub mod inventory;
pub mod repository;
pub mod memory;
pub mod catalog;

pub use product::Product;
pub use inventory::{InventoryError, StockRequest};
pub use repository::ProductRepository;
pub use memory::InMemoryProductRepository;
pub use catalog::{CatalogError, CatalogService};
