pub mod models;
pub mod error;
pub mod repository;
pub mod events;
pub mod memory;
pub mod service;

pub use models::{Order, OrderItemRequest, OrderLineItem, PlaceOrderRequest};
pub use error::OrderError;
pub use repository::OrderRepository;
pub use events::OrderEventSink;
pub use memory::InMemoryOrderRepository;
pub use service::OrderService;
