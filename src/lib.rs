//! Intel Gateway - request layer for the geospatial intel dashboard
//!
//! Provides a TTL response cache and a timeout-bounded fetch gateway that the
//! intel-source routes use to avoid hammering upstream APIs.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod http;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::CleanupTask;
