//! GeoJSON feature model for hotspot detections and auxiliary layers.
//!
//! Properties are kept as an ordered JSON map. Hotspot attributes (`confidence`, `frp`,
//! `satellite`, ...) are read through accessors that apply the dashboard's fallbacks, so a
//! polygon layer with entirely different properties deserializes just as well.

use geo_types::Coord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single coordinate position, `[lon, lat]` or `[lon, lat, z]`.
pub type Position = Vec<f64>;

/// GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Converts a GeoJSON position to a lon/lat coordinate.
    pub fn coord(position: &[f64]) -> Option<Coord<f64>> {
        match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Coord { x: *lon, y: *lat }),
            _ => None,
        }
    }

    /// Every vertex of the geometry, in document order.
    pub fn coords(&self) -> Vec<Coord<f64>> {
        let positions: Vec<&Position> = match self {
            Geometry::Point(p) => vec![p],
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().collect(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().collect()
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().collect(),
        };
        positions.into_iter().filter_map(|p| Self::coord(p)).collect()
    }
}

/// Fire-detection certainty class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceClass {
    High,
    Nominal,
    Low,
}

impl ConfidenceClass {
    pub const ALL: [ConfidenceClass; 3] = [
        ConfidenceClass::High,
        ConfidenceClass::Nominal,
        ConfidenceClass::Low,
    ];

    /// Parses a confidence code, ignoring case and surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "h" => Some(ConfidenceClass::High),
            "n" => Some(ConfidenceClass::Nominal),
            "l" => Some(ConfidenceClass::Low),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfidenceClass::High => "h",
            ConfidenceClass::Nominal => "n",
            ConfidenceClass::Low => "l",
        }
    }

    /// Label used by the legend and the confidence chart.
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceClass::High => "Alta (h)",
            ConfidenceClass::Nominal => "Nominal (n)",
            ConfidenceClass::Low => "Baja (l)",
        }
    }
}

/// One hotspot or polygon record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: Map<String, Value>) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            geometry,
            properties,
        }
    }

    /// Property rendered as display text: strings verbatim, numbers and booleans in their
    /// JSON form, null or absent as `None`.
    pub fn display_property(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Numeric property. Numeric strings are accepted since some WFS backends emit them.
    pub fn number_property(&self, key: &str) -> Option<f64> {
        let value = match self.properties.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// Raw confidence code, if the property is a string.
    pub fn confidence_code(&self) -> Option<&str> {
        self.properties.get("confidence").and_then(Value::as_str)
    }

    pub fn confidence(&self) -> Option<ConfidenceClass> {
        self.confidence_code().and_then(ConfidenceClass::from_code)
    }

    pub fn frp(&self) -> Option<f64> {
        self.number_property("frp")
    }

    /// Satellite label; empty strings count as absent.
    pub fn satellite(&self) -> Option<String> {
        self.display_property("satellite")
            .filter(|label| !label.trim().is_empty())
    }

    pub fn acq_date(&self) -> Option<String> {
        self.display_property("acq_date")
    }

    pub fn acq_time(&self) -> Option<String> {
        self.display_property("acq_time")
    }

    /// Point location from the geometry, or from the `longitude`/`latitude` properties when
    /// the record carries no point geometry.
    pub fn location(&self) -> Option<Coord<f64>> {
        if let Some(Geometry::Point(position)) = &self.geometry {
            if let Some(coord) = Geometry::coord(position) {
                return Some(coord);
            }
        }
        let lon = self.number_property("longitude")?;
        let lat = self.number_property("latitude")?;
        Some(Coord { x: lon, y: lat })
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
