//! Anichart server entry point.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anichart_api::{AppState, router as api_router};
use anichart_common::Config;
use anichart_core::{ChartService, VoteService};
use anichart_queue::{ChartJobExecutor, SchedulerConfig, SchedulerState, run_scheduler};
use axum::Router;
use tokio::{signal, sync::Mutex};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anichart=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting anichart server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = anichart_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    anichart_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let vote_service = VoteService::new(Arc::clone(&db), config.voting.clone());
    let chart_service = ChartService::new(
        Arc::clone(&db),
        config.chart.clone(),
        config.voting.network_hash_salt.clone(),
    );

    // Start the weekly close scheduler
    let scheduler_config = SchedulerConfig::from(&config.chart);
    info!(
        interval_secs = scheduler_config.close_check_interval.as_secs(),
        "Starting weekly close scheduler"
    );
    let scheduler = run_scheduler(
        scheduler_config,
        Arc::new(ChartJobExecutor::new(chart_service.clone())),
        Arc::new(Mutex::new(SchedulerState::default())),
    );

    let state = AppState::new(vote_service, chart_service);

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.abort();
    info!("Server shutdown complete");
    Ok(())
}
