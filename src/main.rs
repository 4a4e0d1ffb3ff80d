//! Horas Backend
//!
//! REST backend for the Horas scheduling and TCO reporting application,
//! with SQLite persistence.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod gate;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Horas Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (HORAS_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // TCOs
        .route("/tcos", get(api::list_tcos))
        .route("/tcos", post(api::create_tco))
        .route("/tcos/check-duplicate", get(api::check_duplicate))
        .route("/tcos/{id}", get(api::get_tco))
        .route("/tcos/{id}", delete(api::delete_tco))
        // Form drafts
        .route("/drafts/{owner}", get(api::get_draft))
        .route("/drafts/{owner}", put(api::save_draft))
        .route("/drafts/{owner}", delete(api::clear_draft))
        // Convocations
        .route("/convocations", get(api::list_convocations))
        .route("/convocations", post(api::create_convocation))
        .route("/convocations/pending", get(api::pending_convocation))
        .route("/convocations/{id}", delete(api::delete_convocation))
        .route("/convocations/{id}/respond", post(api::respond_convocation))
        // Time slots
        .route("/slots", get(api::list_slots))
        .route("/slots", post(api::create_slot))
        .route("/slots/{id}", delete(api::delete_slot))
        .route("/slots/{id}/book", post(api::book_slot))
        .route("/slots/{id}/cancel", post(api::cancel_slot))
        // System version gate
        .route("/version", get(api::get_version))
        .route("/version", put(api::publish_version))
        .route("/version/check", get(api::check_version))
        .route("/version/acknowledge", post(api::acknowledge_version))
        // Users
        .route("/users", get(api::list_users))
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}", put(api::update_user))
        .route("/admin/users/migrate", post(api::migrate_users))
        // Messages
        .route("/messages", get(api::list_messages))
        .route("/messages", post(api::create_message))
        .route("/messages/{id}", delete(api::delete_message))
        // Operations
        .route("/operations", get(api::list_operations))
        .route("/operations", post(api::create_operation))
        .route("/operations/{id}", put(api::update_operation))
        .route("/operations/{id}", delete(api::delete_operation))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
