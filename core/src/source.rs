//! Feature sources and the requests sent to them.
//!
//! A layer can come from the dashboard's backend API or straight from a WFS endpoint such
//! as GeoServer. URL building and body decoding live here so both the desktop viewer and the
//! tests share them; the actual transport belongs to whoever implements [`FeatureSource`].

use crate::feature::FeatureCollection;
use crate::prelude::{DashboardError, DashboardResult, FetchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Which overlay slot a layer occupies. One of each may be on the map at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// FIRMS hotspot detections, loaded from the date picker.
    Hotspots,
    /// Auxiliary layer picked from the layer selector.
    Selector,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Hotspots => f.write_str("hotspots"),
            LayerKind::Selector => f.write_str("selector"),
        }
    }
}

/// One layer fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRequest {
    pub kind: LayerKind,
    pub layer: String,
    /// Acquisition date filter (`YYYY-MM-DD`), hotspot requests only.
    pub date: Option<String>,
}

impl LayerRequest {
    pub fn hotspots(layer: impl Into<String>, date: Option<String>) -> Self {
        Self {
            kind: LayerKind::Hotspots,
            layer: layer.into(),
            date: date.filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn selector(layer: impl Into<String>) -> Self {
        Self {
            kind: LayerKind::Selector,
            layer: layer.into(),
            date: None,
        }
    }

    /// Human-readable name used in messages and logs.
    pub fn describe(&self) -> String {
        match &self.date {
            Some(date) => format!("{} ({date})", self.layer),
            None => self.layer.clone(),
        }
    }
}

/// Anything able to list layers and fetch their features.
pub trait FeatureSource {
    fn layer_names(&self) -> Result<Vec<String>, FetchError>;
    fn fetch(&self, request: &LayerRequest) -> Result<FeatureCollection, FetchError>;
}

fn default_wfs_version() -> String {
    "2.0.0".to_string()
}

/// Where layers are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// The dashboard backend (`/layers`, `/layer_data`, `/hotspots`).
    Backend { base_url: String },
    /// A WFS endpoint; the selectable layers are listed in configuration.
    Wfs {
        base_url: String,
        hotspot_type: String,
        #[serde(default)]
        layers: Vec<String>,
        #[serde(default = "default_wfs_version")]
        version: String,
    },
}

impl SourceConfig {
    /// Name under which the hotspot layer is requested.
    pub fn hotspot_layer(&self) -> &str {
        match self {
            SourceConfig::Backend { .. } => "hotspots",
            SourceConfig::Wfs { hotspot_type, .. } => hotspot_type,
        }
    }

    /// URL returning the layer-name list, or `None` when the list is static.
    pub fn layers_url(&self) -> DashboardResult<Option<Url>> {
        match self {
            SourceConfig::Backend { base_url } => Ok(Some(join(base_url, "layers")?)),
            SourceConfig::Wfs { .. } => Ok(None),
        }
    }

    /// Layer names known without a round trip.
    pub fn static_layers(&self) -> Option<Vec<String>> {
        match self {
            SourceConfig::Backend { .. } => None,
            SourceConfig::Wfs { layers, .. } => Some(layers.clone()),
        }
    }

    /// URL for fetching one layer.
    pub fn request_url(&self, request: &LayerRequest) -> DashboardResult<Url> {
        if request.layer.trim().is_empty() {
            return Err(DashboardError::InvalidRequest("nombre de capa vacío".into()));
        }

        match self {
            SourceConfig::Backend { base_url } => match request.kind {
                LayerKind::Hotspots => {
                    let mut url = join(base_url, "hotspots")?;
                    if let Some(date) = &request.date {
                        url.query_pairs_mut().append_pair("date", date);
                    }
                    Ok(url)
                }
                LayerKind::Selector => {
                    let mut url = join(base_url, "layer_data")?;
                    url.query_pairs_mut().append_pair("name", &request.layer);
                    Ok(url)
                }
            },
            SourceConfig::Wfs {
                base_url, version, ..
            } => {
                let mut url = parse(base_url)?;
                {
                    let mut query = url.query_pairs_mut();
                    query
                        .append_pair("service", "WFS")
                        .append_pair("version", version)
                        .append_pair("request", "GetFeature")
                        .append_pair("typeNames", &request.layer)
                        .append_pair("outputFormat", "application/json")
                        .append_pair("srsName", "EPSG:4326");
                    if let Some(date) = &request.date {
                        if date.contains('\'') {
                            return Err(DashboardError::InvalidRequest(format!(
                                "fecha mal formada {date}"
                            )));
                        }
                        query.append_pair("CQL_FILTER", &format!("acq_date='{date}'"));
                    }
                }
                Ok(url)
            }
        }
    }
}

fn parse(base_url: &str) -> DashboardResult<Url> {
    Url::parse(base_url)
        .map_err(|e| DashboardError::InvalidRequest(format!("URL base inválida {base_url}: {e}")))
}

fn join(base_url: &str, path: &str) -> DashboardResult<Url> {
    let base = if base_url.ends_with('/') {
        parse(base_url)?
    } else {
        parse(&format!("{base_url}/"))?
    };
    base.join(path)
        .map_err(|e| DashboardError::InvalidRequest(format!("ruta inválida {path}: {e}")))
}

/// Decodes the body of a layer-list response.
pub fn parse_layer_names(body: &str) -> Result<Vec<String>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Decodes the body of a layer response.
pub fn parse_feature_collection(body: &str) -> Result<FeatureCollection, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SourceConfig {
        SourceConfig::Backend {
            base_url: "http://127.0.0.1:9000".into(),
        }
    }

    fn wfs() -> SourceConfig {
        SourceConfig::Wfs {
            base_url: "http://localhost:8080/geoserver/firms/ows".into(),
            hotspot_type: "firms:focos_calor".into(),
            layers: vec!["firms:departamentos".into()],
            version: default_wfs_version(),
        }
    }

    #[test]
    fn backend_urls() {
        let config = backend();
        assert_eq!(
            config.layers_url().unwrap().unwrap().as_str(),
            "http://127.0.0.1:9000/layers"
        );
        assert_eq!(
            config
                .request_url(&LayerRequest::selector("áreas protegidas"))
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/layer_data?name=%C3%A1reas+protegidas"
        );
        assert_eq!(
            config
                .request_url(&LayerRequest::hotspots("hotspots", Some("2024-03-14".into())))
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/hotspots?date=2024-03-14"
        );
        assert_eq!(
            config
                .request_url(&LayerRequest::hotspots("hotspots", Some("  ".into())))
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/hotspots"
        );
    }

    #[test]
    fn wfs_urls_carry_get_feature_parameters() {
        let config = wfs();
        assert!(config.layers_url().unwrap().is_none());
        assert_eq!(
            config.static_layers(),
            Some(vec!["firms:departamentos".to_string()])
        );

        let url = config
            .request_url(&LayerRequest::hotspots(
                config.hotspot_layer(),
                Some("2024-03-14".into()),
            ))
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("request".into(), "GetFeature".into())));
        assert!(pairs.contains(&("typeNames".into(), "firms:focos_calor".into())));
        assert!(pairs.contains(&("outputFormat".into(), "application/json".into())));
        assert!(pairs.contains(&("CQL_FILTER".into(), "acq_date='2024-03-14'".into())));
    }

    #[test]
    fn rejects_empty_layer_and_quoted_dates() {
        assert!(matches!(
            backend().request_url(&LayerRequest::selector(" ")),
            Err(DashboardError::InvalidRequest(_))
        ));
        assert!(matches!(
            wfs().request_url(&LayerRequest::hotspots("x", Some("2024' OR '1".into()))),
            Err(DashboardError::InvalidRequest(_))
        ));
    }

    #[test]
    fn source_config_reads_tagged_yaml_shape() {
        let config: SourceConfig = serde_json::from_str(
            r#"{"kind": "wfs", "base_url": "http://gs/ows", "hotspot_type": "firms:hn"}"#,
        )
        .unwrap();
        assert_eq!(config.hotspot_layer(), "firms:hn");
        assert_eq!(config.static_layers(), Some(Vec::new()));
    }

    #[test]
    fn decodes_bodies() {
        assert_eq!(
            parse_layer_names(r#"["a", "b"]"#).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(matches!(
            parse_layer_names("{}"),
            Err(FetchError::Decode(_))
        ));
        let fc = parse_feature_collection(r#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
        assert!(fc.is_empty());
    }
}
