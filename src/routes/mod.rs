//! API Routes
//!
//! - `/api/upload` - Image upload relay to object storage
//! - `/api/health` - Health check

pub mod health;
pub mod upload;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// CORS is restricted to the configured origin and every request is traced.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origin = state.config.server.cors_allowed_origin.clone();

    let api_router = Router::new()
        .merge(upload::router(state.clone()))
        .merge(health::router(state));

    apply_cors(api_router, &origin).layer(TraceLayer::new_for_http())
}
