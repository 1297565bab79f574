//! Optional TOML settings
//!
//! ```toml
//! walk_policy = "strict"
//! boundary_name_property = "NAME_1"
//! cache_dir = "/var/cache/upi-pulse"
//!
//! [name_mapping]
//! "Orissa" = "Odisha"
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::boundary::DEFAULT_NAME_PROPERTY;
use crate::canonical::NameCanonicalizer;
use crate::corpus::WalkPolicy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub walk_policy: WalkPolicy,
    pub boundary_name_property: String,
    /// Extra report-name → boundary-name entries on top of the built-in table
    pub name_mapping: BTreeMap<String, String>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            walk_policy: WalkPolicy::default(),
            boundary_name_property: DEFAULT_NAME_PROPERTY.to_string(),
            name_mapping: BTreeMap::new(),
            cache_dir: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Settings from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn canonicalizer(&self) -> NameCanonicalizer {
        NameCanonicalizer::new().with_extra(self.name_mapping.clone())
    }
}
