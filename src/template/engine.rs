//! Template engine for rendering admin markup

use super::filters;
use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

/// Embedded templates, by name
const TEMPLATES: &[(&str, &str)] = &[
    (
        "selector.html",
        include_str!("../admin/templates/selector.html"),
    ),
    (
        "settings.html",
        include_str!("../admin/templates/settings.html"),
    ),
];

/// Template rendering engine
///
/// Wraps minijinja with custom filters and strict undefined handling.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine with the embedded templates loaded
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();

        // Configure strict undefined handling
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        // Register custom filters
        filters::register_filters(&mut env);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    /// Render a named template with the given context
    pub fn render<C: Serialize>(&self, name: &str, ctx: C) -> Result<String> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(ctx)?)
    }
}
