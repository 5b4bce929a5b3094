//! Markup rendering for the admin screens
//!
//! Templates are embedded at build time and rendered with minijinja. Names
//! ending in `.html` are auto-escaped.

mod engine;
mod filters;

pub use engine::TemplateEngine;
