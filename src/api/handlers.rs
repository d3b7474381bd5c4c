//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints and the intel-source
//! routes. Every intel route follows the same flow: consult the cache, on a
//! miss fetch from upstream, store the payload with the source's TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::features::IntelSource;
use crate::http::{build_url, cache_key, validate_params, FetchGateway, FetchOptions, ParamValue};
use crate::models::{
    ClearResponse, FeaturesResponse, HealthResponse, IntelResponse, InvalidateResponse,
    SatelliteQuery, SeismicQuery, AIRCRAFT_BOUNDS_PARAMS,
};

// == Per-source TTLs ==
pub const AIRCRAFT_TTL: Duration = Duration::from_secs(10);
pub const SATELLITES_TTL: Duration = Duration::from_secs(60 * 60);
pub const SEISMIC_TTL: Duration = Duration::from_secs(5 * 60);
pub const SPACE_WEATHER_TTL: Duration = Duration::from_secs(15 * 60);

/// Application state shared across all handlers.
///
/// The cache is the single process-wide store; it is created here and
/// handed to the sweep task by `main`.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe response cache
    pub cache: SharedCache<Value>,
    /// Outbound HTTP client
    pub gateway: FetchGateway,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState with an empty cache.
    pub fn new(config: Config) -> Self {
        Self {
            cache: CacheStore::shared(),
            gateway: FetchGateway::new(),
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.clone())
    }

    fn require(&self, source: IntelSource) -> Result<()> {
        if self.config.features.is_enabled(source) {
            Ok(())
        } else {
            Err(ApiError::FeatureDisabled(source.slug().to_string()))
        }
    }

    /// Serves `key` from the cache, or fetches `url` and caches the payload.
    ///
    /// Concurrent misses on the same key each go upstream; the last write wins.
    async fn cached_fetch(
        &self,
        source: &str,
        key: String,
        url: &str,
        ttl: Duration,
    ) -> Result<IntelResponse> {
        let cached = self.cache.write().await.get(&key);
        if let Some(data) = cached {
            debug!("Cache hit for {}", key);
            return Ok(IntelResponse::new(source, true, data));
        }

        debug!("Cache miss for {}, fetching {}", key, url);
        let options = FetchOptions::default().with_timeout(self.config.fetch_timeout());
        let data: Value = self.gateway.fetch_json(url, options).await.into_result()?;

        self.cache.write().await.set(key, data.clone(), ttl);
        Ok(IntelResponse::new(source, false, data))
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/features
pub async fn features_handler(State(state): State<AppState>) -> Json<FeaturesResponse> {
    let features = &state.config.features;
    Json(FeaturesResponse {
        enabled: features.enabled_sources(),
        any_enabled: features.any_enabled(),
    })
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    // Read lock; expired entries not yet swept still count
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for DELETE /api/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.len();
    cache.clear();

    Json(ClearResponse::new(removed))
}

/// Handler for DELETE /api/cache/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.invalidate(&key);

    Json(InvalidateResponse { key, removed })
}

/// Handler for GET /api/intel/aircraft
///
/// Proxies OpenSky `states/all` for a lamin/lomin/lamax/lomax bounding box.
pub async fn aircraft_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<IntelResponse>> {
    state.require(IntelSource::Adsb)?;

    let validation = validate_params(&params, &AIRCRAFT_BOUNDS_PARAMS);
    if let Some(missing) = validation.missing {
        return Err(ApiError::MissingParams(missing));
    }

    let mut query = Vec::with_capacity(AIRCRAFT_BOUNDS_PARAMS.len());
    let mut bounds = HashMap::new();
    for name in AIRCRAFT_BOUNDS_PARAMS {
        let raw = params[name].trim();
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ApiError::InvalidRequest(format!("{} must be a finite number", name)))?;
        query.push((name, ParamValue::Float(value)));
        bounds.insert(name.to_string(), raw.to_string());
    }

    let base = format!("{}/states/all", state.config.upstream.opensky);
    let url = build_url(&base, &query).map_err(|e| ApiError::Internal(e.to_string()))?;
    let key = cache_key(IntelSource::Adsb.slug(), &bounds);

    let response = state
        .cached_fetch(IntelSource::Adsb.slug(), key, &url, AIRCRAFT_TTL)
        .await?;
    Ok(Json(response))
}

/// Handler for GET /api/intel/satellites
///
/// Proxies CelesTrak GP element sets (TLE text) for one group.
pub async fn satellites_handler(
    State(state): State<AppState>,
    Query(req): Query<SatelliteQuery>,
) -> Result<Json<IntelResponse>> {
    state.require(IntelSource::Satellites)?;

    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let group = req.group();
    let base = format!("{}/NORAD/elements/gp.php", state.config.upstream.celestrak);
    let url = build_url(&base, &[("GROUP", group.into()), ("FORMAT", "tle".into())])
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let key = cache_key(
        IntelSource::Satellites.slug(),
        &HashMap::from([("group".to_string(), group.to_string())]),
    );

    let response = state
        .cached_fetch(IntelSource::Satellites.slug(), key, &url, SATELLITES_TTL)
        .await?;
    Ok(Json(response))
}

/// Handler for GET /api/intel/seismic
///
/// Proxies a USGS earthquake summary feed (GeoJSON).
pub async fn seismic_handler(
    State(state): State<AppState>,
    Query(req): Query<SeismicQuery>,
) -> Result<Json<IntelResponse>> {
    state.require(IntelSource::Seismic)?;

    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let feed = req.feed();
    let url = format!("{}/summary/{}.geojson", state.config.upstream.usgs, feed);
    let key = cache_key(
        IntelSource::Seismic.slug(),
        &HashMap::from([("feed".to_string(), feed.to_string())]),
    );

    let response = state
        .cached_fetch(IntelSource::Seismic.slug(), key, &url, SEISMIC_TTL)
        .await?;
    Ok(Json(response))
}

/// Handler for GET /api/intel/space-weather
///
/// Proxies the NOAA SWPC planetary K index. Serves both the aurora and the
/// HF propagation panels, so either flag enables it.
pub async fn space_weather_handler(State(state): State<AppState>) -> Result<Json<IntelResponse>> {
    if state.require(IntelSource::RfProp).is_err() {
        state.require(IntelSource::Aurora)?;
    }

    let url = format!(
        "{}/products/noaa-planetary-k-index.json",
        state.config.upstream.swpc
    );
    let key = cache_key("space-weather", &HashMap::new());

    let response = state
        .cached_fetch("space-weather", key, &url, SPACE_WEATHER_TTL)
        .await?;
    Ok(Json(response))
}
