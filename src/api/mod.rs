//! API Module
//!
//! HTTP handlers and routing for the intel gateway.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/features` - Enabled intel sources
//! - `GET /api/cache/stats` - Cache contents and hit counters
//! - `DELETE /api/cache` - Drop every cached response
//! - `DELETE /api/cache/:key` - Drop one cached response
//! - `GET /api/intel/{aircraft,satellites,seismic,space-weather}` - Cached upstream feeds

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
