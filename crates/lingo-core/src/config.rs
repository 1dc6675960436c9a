//! Engine configuration: YAML file plus `LINGO_*` environment overlay.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoordError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ISO-639-1 code used when a translation has no explicit target
    pub default_language: String,
    pub classify_timeout_ms: u64,
    pub plan_timeout_ms: u64,
    /// Use the text-generation provider for classification
    pub ai_classification: bool,
    /// Use the text-generation provider for plan synthesis
    pub ai_planning: bool,
    /// Replaces the embedded category grammar
    pub grammar_path: Option<PathBuf>,
    /// Replaces the embedded formatter templates
    pub templates_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            classify_timeout_ms: 30_000,
            plan_timeout_ms: 120_000,
            ai_classification: true,
            ai_planning: true,
            grammar_path: None,
            templates_path: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoordError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoordError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CoordError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)
            .map_err(|e| CoordError::Config(format!("invalid config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `LINGO_*` environment variables.
    pub fn apply_env(self) -> Result<Self, CoordError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, CoordError> {
        if let Some(lang) = var("LINGO_DEFAULT_LANGUAGE") {
            self.default_language = lang.trim().to_ascii_lowercase();
        }
        if let Some(ms) = var("LINGO_CLASSIFY_TIMEOUT_MS") {
            self.classify_timeout_ms = parse_number("LINGO_CLASSIFY_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = var("LINGO_PLAN_TIMEOUT_MS") {
            self.plan_timeout_ms = parse_number("LINGO_PLAN_TIMEOUT_MS", &ms)?;
        }
        if let Some(flag) = var("LINGO_AI_CLASSIFICATION") {
            self.ai_classification = parse_flag("LINGO_AI_CLASSIFICATION", &flag)?;
        }
        if let Some(flag) = var("LINGO_AI_PLANNING") {
            self.ai_planning = parse_flag("LINGO_AI_PLANNING", &flag)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CoordError> {
        let lang = &self.default_language;
        if lang.len() != 2 || !lang.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(CoordError::Config(format!(
                "default_language must be an ISO-639-1 code, got `{}`",
                lang
            )));
        }
        if self.classify_timeout_ms == 0 || self.plan_timeout_ms == 0 {
            return Err(CoordError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    pub fn plan_timeout(&self) -> Duration {
        Duration::from_millis(self.plan_timeout_ms)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, CoordError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoordError::Config(format!("{} must be a number, got `{}`", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, CoordError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoordError::Config(format!("{} must be a boolean, got `{}`", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.classify_timeout(), Duration::from_secs(30));
        assert_eq!(config.plan_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml("default_language: fr\nai_planning: false\n").unwrap();
        assert_eq!(config.default_language, "fr");
        assert!(!config.ai_planning);
        assert!(config.ai_classification);
        assert_eq!(config.plan_timeout_ms, 120_000);
    }

    #[test]
    fn test_rejects_bad_language() {
        assert!(EngineConfig::from_yaml("default_language: French\n").is_err());
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("LINGO_DEFAULT_LANGUAGE", "DE"),
            ("LINGO_CLASSIFY_TIMEOUT_MS", "500"),
            ("LINGO_AI_CLASSIFICATION", "off"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default()
            .apply_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_language, "de");
        assert_eq!(config.classify_timeout_ms, 500);
        assert!(!config.ai_classification);

        let bad = EngineConfig::default().apply_vars(|k| {
            (k == "LINGO_PLAN_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }
}
