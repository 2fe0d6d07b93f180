use std::sync::Arc;

use tokio::signal;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::{error, info};

use service_orders_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(
        cfg.log_level(),
        cfg.log_json,
        cfg.telemetry_endpoint().as_deref(),
    );

    // Init DB (durable backend, or the ephemeral fallback when unconfigured)
    let db_pool = api::db::establish_connection(&cfg).await?;
    if cfg.auto_migrate {
        // A failed migration is logged but does not abort startup; the
        // process stays up so logs and the health probe remain reachable.
        if let Err(e) = api::db::run_migrations(&db_pool).await {
            error!("Failed running migrations: {}", e);
        }
    }

    let db = Arc::new(db_pool);
    let orders = api::services::orders::ServiceOrderService::new(db.clone(), (&cfg).into());

    let state = api::AppState {
        db,
        config: cfg.clone(),
        orders,
    };

    let app = api::app_router(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Bind and serve
    let addr = format!("{}:{}", cfg.host, cfg.port);
    info!("service-orders-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
