//! Request DTOs for the gateway API
//!
//! Query strings accepted by the intel routes.

use serde::Deserialize;

/// Bounding-box parameters the aircraft route requires, in forwarding order.
pub const AIRCRAFT_BOUNDS_PARAMS: [&str; 4] = ["lamin", "lomin", "lamax", "lomax"];

const USGS_MAGNITUDES: [&str; 5] = ["significant", "4.5", "2.5", "1.0", "all"];
const USGS_PERIODS: [&str; 4] = ["hour", "day", "week", "month"];

/// Query for GET /api/intel/seismic
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeismicQuery {
    /// USGS summary feed name such as `all_day` or `4.5_week`
    #[serde(default)]
    pub feed: Option<String>,
}

impl SeismicQuery {
    pub const DEFAULT_FEED: &'static str = "all_day";

    pub fn feed(&self) -> &str {
        self.feed.as_deref().unwrap_or(Self::DEFAULT_FEED)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let feed = self.feed();
        let known = feed.split_once('_').is_some_and(|(magnitude, period)| {
            USGS_MAGNITUDES.contains(&magnitude) && USGS_PERIODS.contains(&period)
        });
        if known {
            None
        } else {
            Some(format!("Unknown seismic feed '{}'", feed))
        }
    }
}

/// Query for GET /api/intel/satellites
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SatelliteQuery {
    /// CelesTrak group name such as `starlink` or `gps-ops`
    #[serde(default)]
    pub group: Option<String>,
}

impl SatelliteQuery {
    pub const DEFAULT_GROUP: &'static str = "active";

    pub fn group(&self) -> &str {
        self.group.as_deref().unwrap_or(Self::DEFAULT_GROUP)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let group = self.group();
        if group.is_empty() || group.len() > 64 {
            return Some("Satellite group must be 1-64 characters".to_string());
        }
        if !group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Some(format!("Invalid satellite group '{}'", group));
        }
        None
    }
}
