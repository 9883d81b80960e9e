use serde::{Deserialize, Serialize};

/// Query string of `/layer_data`. A missing name reads as blank and is rejected by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerQuery {
    #[serde(default)]
    pub name: String,
}

/// Query string of `/hotspots`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotspotQuery {
    #[serde(default)]
    pub date: Option<String>,
}

impl HotspotQuery {
    /// The requested date, with blank values treated as absent.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

/// JSON body of every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
