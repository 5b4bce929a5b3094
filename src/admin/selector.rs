//! Related-products selector on the product edit screen

use crate::error::Result;
use crate::relations::{EntityId, RelatedList};
use crate::store::{AttributeStore, ProductCatalog};
use crate::template::TemplateEngine;
use minijinja::context;
use serde::Serialize;

/// Host action the selector's search box queries
pub const SEARCH_ACTION: &str = "json_search_products_and_variations";

/// One preselected option of the selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub value: u64,
    pub label: String,
}

/// Current selections for `entity`, skipping IDs the catalog does not know
pub fn selector_options<S>(store: &S, entity: EntityId) -> Result<Vec<SelectorOption>>
where
    S: AttributeStore + ProductCatalog + ?Sized,
{
    let list = RelatedList::load_or_empty(store, entity)?;

    let mut options = Vec::with_capacity(list.len());
    for id in list.iter() {
        if let Some(product) = store.get_product(id)? {
            options.push(SelectorOption {
                value: id.get(),
                label: product.formatted_name(),
            });
        }
    }
    Ok(options)
}

/// Selector markup for the product edit screen
pub fn render_selector<S>(engine: &TemplateEngine, store: &S, entity: EntityId) -> Result<String>
where
    S: AttributeStore + ProductCatalog + ?Sized,
{
    let options = selector_options(store, entity)?;
    engine.render(
        "selector.html",
        context! {
            entity_id => entity.get(),
            search_action => SEARCH_ACTION,
            options => options,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Product, SqliteStore};

    fn id(n: u64) -> EntityId {
        EntityId::new(n).unwrap()
    }

    fn store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_product(
                &Product {
                    id: id(2),
                    name: "Tea <Pot>".into(),
                    sku: Some("TP-1".into()),
                    status: "publish".into(),
                },
                &[],
                &[],
            )
            .unwrap();
        store
            .upsert_product(
                &Product {
                    id: id(3),
                    name: "Cup".into(),
                    sku: None,
                    status: "publish".into(),
                },
                &[],
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_options_skip_unknown_products() {
        let mut store = store();
        let (list, _) = RelatedList::from_submitted(&["3", "99", "2"]);
        list.store(&mut store, id(1)).unwrap();

        let options = selector_options(&store, id(1)).unwrap();
        assert_eq!(
            options,
            vec![
                SelectorOption {
                    value: 3,
                    label: "Cup (#3)".into()
                },
                SelectorOption {
                    value: 2,
                    label: "Tea <Pot> (TP-1)".into()
                },
            ]
        );
    }

    #[test]
    fn test_render_escapes_labels() {
        let mut store = store();
        let (list, _) = RelatedList::from_submitted(&["2"]);
        list.store(&mut store, id(1)).unwrap();

        let engine = TemplateEngine::new().unwrap();
        let html = render_selector(&engine, &store, id(1)).unwrap();

        assert!(html.contains(r#"data-exclude="1""#));
        assert!(html.contains(r#"<option value="2" selected="selected">"#));
        assert!(html.contains("Tea &lt;Pot&gt; (TP-1)"));
    }

    #[test]
    fn test_render_without_selections() {
        let store = store();
        let engine = TemplateEngine::new().unwrap();
        let html = render_selector(&engine, &store, id(1)).unwrap();
        assert!(!html.contains("<option"));
    }
}
