//! Configuration types and loading for related-products

mod loader;

#[allow(unused_imports)]
pub use loader::{AdminConfig, AppConfig, DisplayConfig, LoggingConfig, StoreConfig};
