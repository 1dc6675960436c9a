//! Answer template loading.
//!
//! The embedded `templates/answers.yaml` covers every template the
//! formatter needs. A file given in `templates_path` may override any of
//! them; names it does not define keep their embedded version.

use lazy_static::lazy_static;
use lingo_core::CoordError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_TEMPLATES: &str = include_str!("../templates/answers.yaml");

/// Templates the formatter renders
pub const REQUIRED: [&str; 3] = ["sequential", "parallel", "failure"];

lazy_static! {
    static ref BUILTIN: TemplatesFile =
        TemplatesFile::from_yaml(BUILTIN_TEMPLATES).expect("embedded templates are valid");
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load a file and layer it over the embedded templates
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoordError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoordError::Config(format!("failed to read templates {}: {}", path.display(), e))
        })?;
        let overrides = Self::from_yaml(&content)?;

        let mut merged = Self::builtin();
        merged.version = overrides.version;
        merged.templates.extend(overrides.templates);
        Ok(merged)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CoordError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| CoordError::Config(format!("failed to parse templates YAML: {}", e)))
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Names of required templates this file lacks
    pub fn missing(&self) -> Vec<&'static str> {
        REQUIRED
            .into_iter()
            .filter(|name| !self.templates.contains_key(*name))
            .collect()
    }
}

impl Default for TemplatesFile {
    fn default() -> Self {
        Self::builtin()
    }
}
