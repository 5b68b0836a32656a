use anyhow::Context;
use shopfront_api::{app, state::AppState, worker::run_event_worker};
use shopfront_catalog::CatalogService;
use shopfront_order::OrderService;
use shopfront_store::{app_config::Config, DbClient, EventBus, PgCustomerRepository, PgOrderRepository, PgProductRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_api=debug,shopfront_order=info,shopfront_catalog=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Shopfront API on port {}", config.server.port);

    // Database
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let products = Arc::new(PgProductRepository::new(db.pool.clone()));
    let customers = Arc::new(PgCustomerRepository::new(db.pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));

    // Order events
    let events = EventBus::new(config.events.capacity);
    let worker = tokio::spawn(run_event_worker(
        events.subscribe(),
        config.inventory.low_stock_threshold,
    ));

    let app_state = AppState {
        orders: OrderService::new(products.clone(), customers.clone(), orders).with_events(Arc::new(events)),
        catalog: Arc::new(CatalogService::new(products)),
        customers,
    };

    let app = app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last bus sender, so the worker drains and exits
    match tokio::time::timeout(Duration::from_secs(5), worker).await {
        Ok(stats) => tracing::info!(orders = stats?.orders_seen, "Shutdown complete"),
        Err(_) => tracing::warn!("Event worker did not stop in time"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
