//! Category grammar loading and compilation.
//!
//! The grammar is YAML with, per category:
//! - keywords, matched as whole words
//! - regex patterns, with a `{languages}` placeholder
//!
//! An embedded default ships with the crate; a file can replace it.

use lazy_static::lazy_static;
use lingo_core::{Category, CoordError};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;

use crate::language::LANGUAGE_ALTERNATION;

const BUILTIN_GRAMMAR: &str = include_str!("../grammars/categories.yaml");

lazy_static! {
    static ref BUILTIN: CompiledGrammar =
        CompiledGrammar::from_yaml(BUILTIN_GRAMMAR).expect("embedded grammar is valid");
}

/// Top-level grammar file structure
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarFile {
    pub version: String,
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Compiled grammar ready for scoring
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub version: String,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub category: Category,
    pub description: String,
    pub keywords: Vec<CompiledCue>,
    pub patterns: Vec<CompiledCue>,
}

#[derive(Debug, Clone)]
pub struct CompiledCue {
    pub original: String,
    pub regex: Regex,
}

impl CompiledGrammar {
    /// The grammar shipped with the crate
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load and compile a grammar from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoordError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoordError::Config(format!("failed to read grammar {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Compile a grammar from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, CoordError> {
        let file: GrammarFile = serde_yaml::from_str(yaml)
            .map_err(|e| CoordError::Config(format!("failed to parse grammar YAML: {}", e)))?;

        let mut rules: Vec<CompiledRule> = Vec::new();
        for rule in file.categories {
            let category: Category = rule
                .name
                .parse()
                .map_err(|_| CoordError::Config(format!("unknown category `{}` in grammar", rule.name)))?;
            if rules.iter().any(|r| r.category == category) {
                return Err(CoordError::Config(format!(
                    "category `{}` defined twice in grammar",
                    category
                )));
            }

            let keywords = rule
                .keywords
                .iter()
                .map(|k| compile_keyword(k))
                .collect::<Result<Vec<_>, _>>()?;
            let patterns = rule
                .patterns
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<Vec<_>, _>>()?;

            rules.push(CompiledRule {
                category,
                description: rule.description,
                keywords,
                patterns,
            });
        }

        Ok(CompiledGrammar {
            version: file.version,
            rules,
        })
    }

    pub fn rule(&self, category: Category) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.category == category)
    }
}

impl Default for CompiledGrammar {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Keywords match as whole words; multi-word keywords tolerate any spacing
fn compile_keyword(keyword: &str) -> Result<CompiledCue, CoordError> {
    let words: Vec<String> = keyword
        .split_whitespace()
        .map(|w| regex::escape(&w.to_lowercase()))
        .collect();
    if words.is_empty() {
        return Err(CoordError::Config("empty keyword in grammar".to_string()));
    }
    let regex_str = format!(r"(?:^|\W){}(?:\W|$)", words.join(r"\s+"));
    build(keyword, &regex_str)
}

/// Expand `{languages}` and compile case-insensitively
fn compile_pattern(pattern: &str) -> Result<CompiledCue, CoordError> {
    let expanded = pattern.replace("{languages}", LANGUAGE_ALTERNATION.as_str());
    build(pattern, &expanded)
}

fn build(original: &str, regex_str: &str) -> Result<CompiledCue, CoordError> {
    let regex = RegexBuilder::new(regex_str)
        .case_insensitive(true)
        .build()
        .map_err(|e| CoordError::Config(format!("invalid grammar pattern `{}`: {}", original, e)))?;
    Ok(CompiledCue {
        original: original.to_string(),
        regex,
    })
}
