//! CLI module for related-products
//!
//! This module provides:
//! - Command implementations (save, show, decisions, settings, catalog)
//! - Output handlers (console, JSON, quiet)

pub mod commands;
pub mod output;

#[allow(unused_imports)]
pub use output::{OutputEvent, OutputHandler, OutputMode, create_handler};
