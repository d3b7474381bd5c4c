//! Feature Flags
//!
//! Switches deciding which intel sources the routes may call. Read once from
//! `PUBLIC_FEATURE_*` environment variables; a flag is on only when its value
//! is exactly `true`.

use std::env;

use serde::Serialize;

/// Third-party data feeds the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntelSource {
    Adsb,
    Satellites,
    Spectrum,
    Shodan,
    Wigle,
    Seismic,
    RfProp,
    Aurora,
}

impl IntelSource {
    /// Every source, in display order.
    pub const ALL: [IntelSource; 8] = [
        IntelSource::Adsb,
        IntelSource::Satellites,
        IntelSource::Spectrum,
        IntelSource::Shodan,
        IntelSource::Wigle,
        IntelSource::Seismic,
        IntelSource::RfProp,
        IntelSource::Aurora,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            IntelSource::Adsb => "adsb",
            IntelSource::Satellites => "satellites",
            IntelSource::Spectrum => "spectrum",
            IntelSource::Shodan => "shodan",
            IntelSource::Wigle => "wigle",
            IntelSource::Seismic => "seismic",
            IntelSource::RfProp => "rf-prop",
            IntelSource::Aurora => "aurora",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            IntelSource::Adsb => "PUBLIC_FEATURE_ADSB",
            IntelSource::Satellites => "PUBLIC_FEATURE_SATELLITES",
            IntelSource::Spectrum => "PUBLIC_FEATURE_SPECTRUM",
            IntelSource::Shodan => "PUBLIC_FEATURE_SHODAN",
            IntelSource::Wigle => "PUBLIC_FEATURE_WIGLE",
            IntelSource::Seismic => "PUBLIC_FEATURE_SEISMIC",
            IntelSource::RfProp => "PUBLIC_FEATURE_RF_PROP",
            IntelSource::Aurora => "PUBLIC_FEATURE_AURORA",
        }
    }
}

/// Master switch plus one flag per source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntelFeatures {
    pub intel_sources: bool,
    pub adsb: bool,
    pub satellites: bool,
    pub spectrum: bool,
    pub shodan: bool,
    pub wigle: bool,
    pub seismic: bool,
    pub rf_prop: bool,
    pub aurora: bool,
}

impl IntelFeatures {
    /// Loads flags from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads flags through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| lookup(name).as_deref() == Some("true");
        let mut features = Self {
            intel_sources: flag("PUBLIC_FEATURE_INTEL_SOURCES"),
            ..Self::default()
        };
        for source in IntelSource::ALL {
            *features.flag_mut(source) = flag(source.env_var());
        }
        features
    }

    /// Every flag on; handy for tests and local development.
    pub fn all_enabled() -> Self {
        let mut features = Self {
            intel_sources: true,
            ..Self::default()
        };
        for source in IntelSource::ALL {
            *features.flag_mut(source) = true;
        }
        features
    }

    fn flag(&self, source: IntelSource) -> bool {
        match source {
            IntelSource::Adsb => self.adsb,
            IntelSource::Satellites => self.satellites,
            IntelSource::Spectrum => self.spectrum,
            IntelSource::Shodan => self.shodan,
            IntelSource::Wigle => self.wigle,
            IntelSource::Seismic => self.seismic,
            IntelSource::RfProp => self.rf_prop,
            IntelSource::Aurora => self.aurora,
        }
    }

    fn flag_mut(&mut self, source: IntelSource) -> &mut bool {
        match source {
            IntelSource::Adsb => &mut self.adsb,
            IntelSource::Satellites => &mut self.satellites,
            IntelSource::Spectrum => &mut self.spectrum,
            IntelSource::Shodan => &mut self.shodan,
            IntelSource::Wigle => &mut self.wigle,
            IntelSource::Seismic => &mut self.seismic,
            IntelSource::RfProp => &mut self.rf_prop,
            IntelSource::Aurora => &mut self.aurora,
        }
    }

    /// A source is enabled only when the master switch is on as well.
    pub fn is_enabled(&self, source: IntelSource) -> bool {
        self.intel_sources && self.flag(source)
    }

    pub fn any_enabled(&self) -> bool {
        IntelSource::ALL.iter().any(|source| self.is_enabled(*source))
    }

    /// Slugs of the enabled sources, in display order.
    pub fn enabled_sources(&self) -> Vec<&'static str> {
        IntelSource::ALL
            .iter()
            .filter(|source| self.is_enabled(**source))
            .map(|source| source.slug())
            .collect()
    }
}
