//! Region boundary reference (GeoJSON feature collection)
//!
//! Only the name property is interpreted. Geometry and the remaining
//! properties are kept as opaque JSON for whoever renders the map.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::canonical::normalize;

/// Property holding the region name in the usual state-level boundary files
pub const DEFAULT_NAME_PROPERTY: &str = "NAME_1";

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    geometry: Value,
}

/// One boundary feature
#[derive(Debug, Clone)]
pub struct RegionBoundary {
    /// Name as spelled in the reference
    pub name: String,
    /// Normalized join key
    pub key: String,
    pub properties: Map<String, Value>,
    pub geometry: Value,
}

/// Boundary features indexed by normalized name
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    features: Vec<RegionBoundary>,
    by_key: HashMap<String, usize>,
}

impl BoundarySet {
    pub fn load(path: &Path, name_property: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read boundaries: {:?}", path))?;
        let set = Self::from_geojson(&text, name_property)
            .with_context(|| format!("Failed to parse boundaries: {:?}", path))?;
        info!("Loaded {} boundary features from {:?}", set.len(), path);
        Ok(set)
    }

    /// Parse a feature collection. Features without a string name property
    /// are ignored; the first feature wins when two share a normalized name.
    pub fn from_geojson(text: &str, name_property: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_str(text).context("Not a GeoJSON feature collection")?;

        let mut set = Self::default();
        for feature in collection.features {
            let Some(name) = feature
                .properties
                .get(name_property)
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                debug!("Ignoring feature without `{}`", name_property);
                continue;
            };

            let key = normalize(&name);
            set.by_key.entry(key.clone()).or_insert(set.features.len());
            set.features.push(RegionBoundary {
                name,
                key,
                properties: feature.properties,
                geometry: feature.geometry,
            });
        }

        Ok(set)
    }

    /// Look up a feature by an already-normalized key
    pub fn get(&self, key: &str) -> Option<&RegionBoundary> {
        self.by_key.get(key).map(|&i| &self.features[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
