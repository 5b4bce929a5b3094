//! SQLite-backed catalog store

use super::schema::init_schema;
use super::{AttributeStore, OptionStore, Product, ProductCatalog};
use crate::error::{RelatedError, Result};
use crate::relations::{EntityId, RelatedQuery, Taxonomy};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog storage on a single SQLite connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the catalog database
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog database at {}", path.display()))?;

        init_schema(&conn).context("Failed to initialize catalog schema")?;

        Ok(Self { conn })
    }

    /// Fresh in-memory catalog
    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Get the default catalog database path
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let data_dir = dirs::data_dir().context("Could not determine data directory")?;

        let store_dir = data_dir.join("related-products");
        std::fs::create_dir_all(&store_dir).with_context(|| {
            format!("Failed to create data directory at {}", store_dir.display())
        })?;

        Ok(store_dir.join("catalog.db"))
    }

    /// Insert or replace a product together with its taxonomy terms
    pub fn upsert_product(
        &mut self,
        product: &Product,
        categories: &[u64],
        tags: &[u64],
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO products (id, name, sku, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                sku = excluded.sku,
                status = excluded.status",
            (
                product.id.get() as i64,
                &product.name,
                &product.sku,
                &product.status,
                &now,
            ),
        )?;

        tx.execute(
            "DELETE FROM product_terms WHERE product_id = ?1",
            [product.id.get() as i64],
        )?;

        for (taxonomy, terms) in [(Taxonomy::Category, categories), (Taxonomy::Tag, tags)] {
            for term in terms {
                tx.execute(
                    "INSERT OR IGNORE INTO product_terms (product_id, taxonomy, term_id)
                     VALUES (?1, ?2, ?3)",
                    (product.id.get() as i64, taxonomy.as_str(), *term as i64),
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// All products, ordered by ID
    pub fn list_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, sku, status FROM products ORDER BY id")?;

        let products = stmt
            .query_map([], product_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(products.into_iter().flatten().collect())
    }
}

fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<Option<Product>> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let sku: Option<String> = row.get(2)?;
    let status: String = row.get(3)?;

    Ok(EntityId::new(id.unsigned_abs()).map(|id| Product {
        id,
        name,
        sku,
        status,
    }))
}

impl AttributeStore for SqliteStore {
    fn get_attribute(&self, entity: EntityId, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT meta_value FROM entity_meta WHERE entity_id = ?1 AND meta_key = ?2",
                (entity.get() as i64, key),
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|source| RelatedError::Corrupt {
                entity: entity.get(),
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn set_attribute(&mut self, entity: EntityId, key: &str, value: &Value) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let encoded = serde_json::to_string(value)?;

        self.conn.execute(
            "INSERT INTO entity_meta (entity_id, meta_key, meta_value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(entity_id, meta_key) DO UPDATE SET
                meta_value = excluded.meta_value,
                updated_at = excluded.updated_at",
            (entity.get() as i64, key, &encoded, &now),
        )?;

        debug!(entity = %entity, key, value = %encoded, "attribute written");
        Ok(())
    }

    fn delete_attribute(&mut self, entity: EntityId, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM entity_meta WHERE entity_id = ?1 AND meta_key = ?2",
            (entity.get() as i64, key),
        )?;

        debug!(entity = %entity, key, "attribute deleted");
        Ok(())
    }
}

impl OptionStore for SqliteStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM options WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?)
    }

    fn update_option(&mut self, name: &str, value: &Value) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO options (name, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            (name, serde_json::to_string(value)?, &now),
        )?;

        Ok(())
    }

    fn delete_option(&mut self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM options WHERE name = ?1", [name])?;
        Ok(())
    }
}

impl ProductCatalog for SqliteStore {
    fn get_product(&self, id: EntityId) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                "SELECT id, name, sku, status FROM products WHERE id = ?1",
                [id.get() as i64],
                product_from_row,
            )
            .optional()?;

        Ok(product.flatten())
    }

    fn product_terms(&self, id: EntityId, taxonomy: Taxonomy) -> Result<Vec<u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT term_id FROM product_terms
             WHERE product_id = ?1 AND taxonomy = ?2
             ORDER BY term_id",
        )?;

        let terms = stmt
            .query_map((id.get() as i64, taxonomy.as_str()), |row| {
                row.get::<_, i64>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(terms.into_iter().map(|t| t.unsigned_abs()).collect())
    }

    fn run_related_query(&self, query: &RelatedQuery) -> Result<Vec<EntityId>> {
        let sql = query.to_sql();
        debug!(%sql, "running related products query");

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ids
            .into_iter()
            .filter_map(|id| EntityId::new(id.unsigned_abs()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(n: u64) -> EntityId {
        EntityId::new(n).unwrap()
    }

    fn product(n: u64, name: &str) -> Product {
        Product {
            id: id(n),
            name: name.into(),
            sku: None,
            status: "publish".into(),
        }
    }

    #[test]
    fn test_attribute_roundtrip_and_delete() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(store.get_attribute(id(1), "_related_ids").unwrap().is_none());

        store
            .set_attribute(id(1), "_related_ids", &json!([3, 7]))
            .unwrap();
        assert_eq!(
            store.get_attribute(id(1), "_related_ids").unwrap(),
            Some(json!([3, 7]))
        );

        store
            .set_attribute(id(1), "_related_ids", &json!([9]))
            .unwrap();
        assert_eq!(
            store.get_attribute(id(1), "_related_ids").unwrap(),
            Some(json!([9]))
        );

        store.delete_attribute(id(1), "_related_ids").unwrap();
        assert!(store.get_attribute(id(1), "_related_ids").unwrap().is_none());

        // Deleting twice is fine
        store.delete_attribute(id(1), "_related_ids").unwrap();
    }

    #[test]
    fn test_attributes_are_per_entity() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .set_attribute(id(1), "_related_ids", &json!([2]))
            .unwrap();

        assert!(store.get_attribute(id(2), "_related_ids").unwrap().is_none());
        assert!(store.get_attribute(id(1), "other").unwrap().is_none());
    }

    #[test]
    fn test_options() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(store.get_option("crpr_reciprocate").unwrap().is_none());
        store
            .update_option("crpr_reciprocate", &json!(true))
            .unwrap();
        assert_eq!(
            store.get_option("crpr_reciprocate").unwrap(),
            Some(json!(true))
        );
        store.delete_option("crpr_reciprocate").unwrap();
        assert!(store.get_option("crpr_reciprocate").unwrap().is_none());
    }

    #[test]
    fn test_products_and_terms() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store
            .upsert_product(&product(10, "Mug"), &[3, 1], &[7])
            .unwrap();
        store.upsert_product(&product(11, "Plate"), &[], &[]).unwrap();

        assert_eq!(store.get_product(id(10)).unwrap().unwrap().name, "Mug");
        assert!(store.get_product(id(99)).unwrap().is_none());
        assert_eq!(
            store.product_terms(id(10), Taxonomy::Category).unwrap(),
            vec![1, 3]
        );
        assert_eq!(store.product_terms(id(10), Taxonomy::Tag).unwrap(), vec![7]);

        // Re-upserting replaces terms
        store.upsert_product(&product(10, "Big Mug"), &[5], &[]).unwrap();
        assert_eq!(
            store.product_terms(id(10), Taxonomy::Category).unwrap(),
            vec![5]
        );
        assert!(store.product_terms(id(10), Taxonomy::Tag).unwrap().is_empty());

        let names: Vec<_> = store
            .list_products()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Big Mug", "Plate"]);
    }

    #[test]
    fn test_on_disk_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .set_attribute(id(4), "_related_ids", &json!([5]))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get_attribute(id(4), "_related_ids").unwrap(),
            Some(json!([5]))
        );
    }
}
