use anyhow::Context;
use firmscore::projection::Viewport;
use firmscore::source::SourceConfig;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Overrides `source` with a backend at this URL.
pub const API_URL_VAR: &str = "FIRMS_API_URL";
/// Overrides `source` with a WFS endpoint at this URL.
pub const WFS_URL_VAR: &str = "FIRMS_WFS_URL";
/// Path of the optional YAML config file.
pub const CONFIG_VAR: &str = "FIRMS_DASHBOARD_CONFIG";

/// Viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    /// How long transient messages stay up.
    pub message_seconds: u64,
    pub request_timeout_secs: u64,
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::Backend {
                base_url: "http://127.0.0.1:9000".to_string(),
            },
            message_seconds: 4,
            request_timeout_secs: 30,
            center_lon: -86.2,
            center_lat: 14.75,
            zoom: 8.0,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Config file named by `FIRMS_DASHBOARD_CONFIG` (or defaults), then the URL variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = match std::env::var_os(CONFIG_VAR) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    /// Applies `FIRMS_API_URL` / `FIRMS_WFS_URL`; the API URL wins when both are set.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(WFS_URL_VAR) {
            self.source = match self.source {
                SourceConfig::Wfs {
                    hotspot_type,
                    layers,
                    version,
                    ..
                } => SourceConfig::Wfs {
                    base_url: url,
                    hotspot_type,
                    layers,
                    version,
                },
                SourceConfig::Backend { .. } => SourceConfig::Wfs {
                    base_url: url,
                    hotspot_type: "FIRMS_HN".to_string(),
                    layers: Vec::new(),
                    version: "2.0.0".to_string(),
                },
            };
        }
        if let Some(url) = non_empty(API_URL_VAR) {
            self.source = SourceConfig::Backend { base_url: url };
        }
        self
    }

    pub fn message_duration(&self) -> Duration {
        Duration::from_secs(self.message_seconds.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            Coord {
                x: self.center_lon,
                y: self.center_lat,
            },
            self.zoom,
        )
    }
}
