//! Mapping configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "naming": "camel_case",
//!   "overrides": { "people": { "names": "nm" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::{ConventionResolver, NamingConvention, OverrideResolver};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read mapping config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid mapping config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Convention for properties without a declared rename or override.
    pub naming: NamingConvention,
    /// `collection -> property -> field`. Takes precedence over declared renames.
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl MappingConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The resolver this configuration describes.
    pub fn resolver(&self) -> OverrideResolver<ConventionResolver> {
        OverrideResolver::new(self.overrides.clone(), ConventionResolver::new(self.naming))
    }
}
