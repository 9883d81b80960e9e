use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server settings, read from YAML and then overridden from the command line.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding one `<layer>.geojson` file per layer.
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    /// Layer served by `/hotspots`.
    pub hotspot_layer: String,
    /// Offline summaries are appended here when set.
    pub report: Option<PathBuf>,
    /// Settings for `--generate`.
    pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            hotspot_layer: "FIRMS_HN".to_string(),
            report: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        bind: Option<SocketAddr>,
        hotspot_layer: Option<String>,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(hotspot_layer) = hotspot_layer {
            self.hotspot_layer = hotspot_layer;
        }
        self
    }
}
