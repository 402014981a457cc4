use inventory_hub::catalog::{AppState, Catalog};
use inventory_hub::config::ServerConfig;
use inventory_hub::logging;
use inventory_hub::router::create_app_router;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();
    logging::init(config.as_ref().map(|c| c.environment).unwrap_or_default());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Build the catalog once; every request reads this same instance
    let catalog = match Catalog::seeded() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "invalid product catalog");
            std::process::exit(1);
        }
    };

    let addr = config.listen_addr;
    let environment = config.environment;
    let products = catalog.len();

    // Build application router with all routes and middleware
    let app = create_app_router(AppState::new(config, catalog).shared());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, %environment, products, "inventory hub listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
