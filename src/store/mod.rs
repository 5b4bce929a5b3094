//! Catalog storage - the attribute, option and product primitives the
//! relation logic runs against

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::relations::{EntityId, RelatedQuery, Taxonomy};
use serde::Serialize;
use serde_json::Value;

/// Per-entity attribute storage
///
/// Single-key reads and writes are atomic; nothing spans keys or entities.
pub trait AttributeStore {
    fn get_attribute(&self, entity: EntityId, key: &str) -> Result<Option<Value>>;

    /// Replace the attribute value in full
    fn set_attribute(&mut self, entity: EntityId, key: &str, value: &Value) -> Result<()>;

    /// Remove the attribute; removing a missing attribute is not an error
    fn delete_attribute(&mut self, entity: EntityId, key: &str) -> Result<()>;
}

/// Process-wide named options
pub trait OptionStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>>;

    fn update_option(&mut self, name: &str, value: &Value) -> Result<()>;

    fn delete_option(&mut self, name: &str) -> Result<()>;
}

/// A product as the catalog knows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub sku: Option<String>,
    pub status: String,
}

impl Product {
    /// Label shown in the admin selector: `Name (SKU)` or `Name (#ID)`
    pub fn formatted_name(&self) -> String {
        match self.sku.as_deref() {
            Some(sku) if !sku.is_empty() => format!("{} ({})", self.name, sku),
            _ => format!("{} (#{})", self.name, self.id),
        }
    }
}

/// Product lookup and the host's related-products query execution
pub trait ProductCatalog {
    fn get_product(&self, id: EntityId) -> Result<Option<Product>>;

    /// Term IDs assigned to a product in the given taxonomy
    fn product_terms(&self, id: EntityId, taxonomy: Taxonomy) -> Result<Vec<u64>>;

    fn run_related_query(&self, query: &RelatedQuery) -> Result<Vec<EntityId>>;
}
