//! Database schema for the catalog store

use rusqlite::Connection;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entity_meta (
            entity_id INTEGER NOT NULL,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (entity_id, meta_key)
        );

        CREATE TABLE IF NOT EXISTS options (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            sku TEXT,
            status TEXT NOT NULL DEFAULT 'publish',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_status ON products(status);

        CREATE TABLE IF NOT EXISTS product_terms (
            product_id INTEGER NOT NULL,
            taxonomy TEXT NOT NULL,
            term_id INTEGER NOT NULL,
            PRIMARY KEY (product_id, taxonomy, term_id)
        );

        CREATE INDEX IF NOT EXISTS idx_product_terms_term ON product_terms(taxonomy, term_id);
        "#,
    )
}
