//! Handlebars rendering for answer templates.
//!
//! Registers the `plural` helper, which picks a word by count.

use handlebars::{handlebars_helper, no_escape, Handlebars};
use lingo_core::CoordError;
use serde_json::Value;

use crate::templates::TemplatesFile;

handlebars_helper!(plural: |count: u64, one: str, many: str| {
    if count == 1 { one.to_string() } else { many.to_string() }
});

/// Compiled renderer with registered helpers
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new(templates: &TemplatesFile) -> Result<Self, CoordError> {
        let missing = templates.missing();
        if !missing.is_empty() {
            return Err(CoordError::Config(format!(
                "templates file lacks: {}",
                missing.join(", ")
            )));
        }

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // answers are plain text, not HTML
        handlebars.register_escape_fn(no_escape);
        handlebars.register_helper("plural", Box::new(plural));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| CoordError::Config(format!("template `{}`: {}", name, e)))?;
        }

        Ok(TemplateRenderer { handlebars })
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<String, CoordError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| CoordError::Config(format!("render `{}`: {}", name, e)))
    }
}
