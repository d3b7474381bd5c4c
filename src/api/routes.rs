//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    aircraft_handler, cache_stats_handler, clear_cache_handler, features_handler, health_handler,
    invalidate_handler, satellites_handler, seismic_handler, space_weather_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin so the dashboard can call it from the browser
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let intel = Router::new()
        .route("/aircraft", get(aircraft_handler))
        .route("/satellites", get(satellites_handler))
        .route("/seismic", get(seismic_handler))
        .route("/space-weather", get(space_weather_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/features", get(features_handler))
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache", delete(clear_cache_handler))
        .route("/api/cache/:key", delete(invalidate_handler))
        .nest("/api/intel", intel)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
