// CrowdCatch Upload - image upload form and S3 relay

pub mod config;
pub mod models;
pub mod types;
pub mod storage;
pub mod routes;
pub mod middleware;
pub mod client;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::{AppState, UploadResponse};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
