//! Outbound HTTP Module
//!
//! Timeout-bounded fetch gateway plus URL and parameter helpers used by the
//! intel routes.

mod fetch;
pub mod params;

pub use fetch::{FetchGateway, FetchOptions, FetchResult, Method, Payload, RequestBody, DEFAULT_TIMEOUT};
pub use params::{build_url, cache_key, validate_params, ParamValidation, ParamValue};
