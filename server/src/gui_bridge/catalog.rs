use firmscore::feature::FeatureCollection;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LAYER_EXTENSION: &str = "geojson";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("layer name {0:?} is not allowed")]
    InvalidName(String),
    #[error("layer {0} not found")]
    NotFound(String),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decoding {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Layers stored as GeoJSON files in one directory, named by file stem.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    data_dir: PathBuf,
    hotspot_layer: String,
}

impl LayerCatalog {
    pub fn new(data_dir: impl Into<PathBuf>, hotspot_layer: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            hotspot_layer: hotspot_layer.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Sorted names of every `*.geojson` file in the data directory.
    pub fn names(&self) -> Result<Vec<String>, CatalogError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|source| CatalogError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(LAYER_EXTENSION)
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|name| is_valid_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<FeatureCollection, CatalogError> {
        let path = self.path_for(name)?;
        let contents = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogError::NotFound(name.to_string())
            } else {
                CatalogError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let collection: FeatureCollection = serde_json::from_str(&contents)
            .map_err(|source| CatalogError::Decode { path, source })?;
        debug!("layer {name}: {} features", collection.len());
        Ok(collection)
    }

    /// The hotspot layer, optionally narrowed to one acquisition date.
    ///
    /// Dates are compared as text, the same way they are displayed.
    pub fn hotspots(&self, date: Option<&str>) -> Result<FeatureCollection, CatalogError> {
        let mut collection = self.load(&self.hotspot_layer)?;
        if let Some(date) = date {
            collection
                .features
                .retain(|feature| feature.acq_date().as_deref() == Some(date));
        }
        Ok(collection)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, CatalogError> {
        if !is_valid_name(name) {
            return Err(CatalogError::InvalidName(name.to_string()));
        }
        Ok(self.data_dir.join(format!("{name}.{LAYER_EXTENSION}")))
    }
}

/// Letters, digits, `_`, `-` and inner spaces only, so a name can never leave the data
/// directory.
fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name.trim() == name
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
}
