// CORS configuration
// Browsers may call the relay from exactly one origin; other origins get no
// allow-origin header.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

pub fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::list([value]),
        Err(e) => {
            // Unparseable origin: no cross-origin access at all.
            error!(origin, "Invalid ALLOWED_ORIGIN, rejecting all cross-origin requests: {}", e);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn apply_cors(router: Router, origin: &str) -> Router {
    router.layer(cors_layer(origin))
}
