//! Pushboard HTTP API Server
//!
//! Provides REST API endpoints for managing push-notification templates
//! stored as JSON files in a directory.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    response::Json,
    routing::get,
};
use pushboard_store::{FileStorage, TemplateStorage};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};

mod config;
mod error;
mod models;
mod routes;

use config::ServerConfig;
use error::{ApiError, Result};
use models::HealthResponse;

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn TemplateStorage>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "pushboard_server=debug,pushboard_store=debug,tower_http=debug".to_string()
        }))
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        "Starting Pushboard Server on {}:{}",
        config.host, config.port
    );

    // Opening the store creates the templates directory before the first request
    let storage = FileStorage::new(&config.templates_dir).await.map_err(|e| {
        error!(
            "Failed to open template store at {}: {}",
            config.templates_dir.display(),
            e
        );
        e
    })?;
    info!("Serving templates from {}", config.templates_dir.display());

    let state = AppState {
        storage: Arc::new(storage),
    };

    // Build router
    let app = create_router(state, &config)?;

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid HOST value: {}", config.host)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let mut router = Router::new()
        // API routes
        .nest("/api", api_routes());

    // Editor front end, if configured
    if let Some(static_dir) = &config.static_dir {
        info!("Serving static files from {}", static_dir.display());
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    Ok(router
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)?)
                .layer(DefaultBodyLimit::max(config.max_body_bytes)),
        )
        .with_state(state))
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/templates", routes::templates::router())
}

/// CORS policy from the configured origin list
fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    if config.cors_permissive() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ApiError::Config(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_TYPE]))
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
