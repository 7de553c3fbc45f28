use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use prerender_shortener::config::{redact_database_url, Config};
use prerender_shortener::handlers::{
    GenerateRequest, GenerateResponse, HealthResponse, StatusResponse,
};
use prerender_shortener::queue::QueueStatus;
use prerender_shortener::state::AppState;
use prerender_shortener::{build_router, handlers};

/// Time given to render workers to finish buffered jobs on shutdown
const DRAIN_GRACE: Duration = Duration::from_secs(30);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::health::service_status,
        handlers::link::generate_short_code,
        handlers::link::redirect,
    ),
    components(schemas(
        GenerateRequest,
        GenerateResponse,
        HealthResponse,
        StatusResponse,
        QueueStatus,
    )),
    tags(
        (name = "Health", description = "Health check and monitoring endpoints"),
        (name = "Links", description = "Shorten URLs and follow short links")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prerender_shortener=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.server_addr();

    // Initialize application state (connects to the database, starts render workers)
    tracing::info!(
        database = %redact_database_url(&config.database_url),
        "Connecting to database..."
    );
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!(
        workers = state.config.render_worker_count,
        backend = ?state.config.render_backend,
        "Database connection established, render queue running"
    );
    let render_queue = state.render_queue.clone();

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down gracefully...");
    render_queue.shutdown().await;
    render_queue.join_workers(DRAIN_GRACE).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
