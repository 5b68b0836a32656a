use shopfront_catalog::CatalogService;
use shopfront_core::CustomerRepository;
use shopfront_order::OrderService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub catalog: Arc<CatalogService>,
    pub customers: Arc<dyn CustomerRepository>,
}
