//! Curated related products
//!
//! An administrator picks the related products for an entity; the picks
//! replace the host's category/tag similarity and can be mirrored back onto
//! each picked entity.
//!
//! - [`hooks`]: decisions the host asks for when showing related products
//! - [`save`]: persisting an edit-form selection, with reciprocation
//! - [`pipeline`]: the host's lookup with those decisions applied

mod entity;
pub mod hooks;
pub mod pipeline;
mod query;
mod related_list;
pub mod save;
pub mod settings;

#[allow(unused_imports)]
pub use entity::{EntityId, Taxonomy};
pub use hooks::ExtensionPoint;
pub use query::RelatedQuery;
#[allow(unused_imports)]
pub use related_list::{RELATED_IDS_KEY, RelatedList, is_curated};
pub use save::SaveReport;
pub use settings::{EmptyBehavior, Settings};
