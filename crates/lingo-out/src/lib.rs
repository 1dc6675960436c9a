//! Lingo-OUT: step results to one displayable answer
//!
//! Answers are assembled from Handlebars templates. The embedded set lives
//! in `templates/answers.yaml`; a YAML file can override any template.
//!
//! # Example
//!
//! ```ignore
//! use lingo_out::ResultFormatter;
//!
//! let formatter = ResultFormatter::builtin()?;
//! let answer = formatter.format(&result);
//! ```

pub mod formatter;
pub mod renderer;
pub mod templates;

pub use formatter::{agent_heading, ResultFormatter};
pub use renderer::TemplateRenderer;
pub use templates::TemplatesFile;

use lingo_core::CoordError;
use std::path::Path;

/// Formatter from an optional override file
pub fn load_formatter(templates_path: Option<&Path>) -> Result<ResultFormatter, CoordError> {
    let templates = match templates_path {
        Some(path) => TemplatesFile::load(path)?,
        None => TemplatesFile::builtin(),
    };
    Ok(ResultFormatter::new(TemplateRenderer::new(&templates)?))
}
