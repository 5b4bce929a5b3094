//! Related-products lookup as the host runs it, with the relation callbacks applied

use super::hooks::{filter_related_query, force_display, relate_by_taxonomy};
use super::settings::Settings;
use super::{EntityId, RelatedQuery, Taxonomy};
use crate::error::Result;
use crate::store::{AttributeStore, ProductCatalog};
use tracing::debug;

/// The related-products query the host would run for `entity`
///
/// `None` when there is nothing to look up: no curated relations to force the
/// block and no taxonomy terms to match on.
pub fn build_query<S>(
    store: &S,
    settings: &Settings,
    entity: EntityId,
    limit: usize,
) -> Result<Option<RelatedQuery>>
where
    S: AttributeStore + ProductCatalog + ?Sized,
{
    let forced = force_display(store, entity, false)?;

    let mut terms = [Vec::new(), Vec::new()];
    for (slot, taxonomy) in terms.iter_mut().zip(Taxonomy::ALL) {
        if relate_by_taxonomy(store, settings, entity, taxonomy, true)? {
            *slot = store.product_terms(entity, taxonomy)?;
        }
    }
    let [categories, tags] = terms;

    if !forced && categories.is_empty() && tags.is_empty() {
        debug!(entity = %entity, "no related products to look up");
        return Ok(None);
    }

    let query = RelatedQuery::similar(&[entity], &categories, &tags, limit);
    filter_related_query(store, entity, query).map(Some)
}

/// Related product IDs for `entity`, at most `limit`
pub fn related_products<S>(
    store: &S,
    settings: &Settings,
    entity: EntityId,
    limit: usize,
) -> Result<Vec<EntityId>>
where
    S: AttributeStore + ProductCatalog + ?Sized,
{
    match build_query(store, settings, entity, limit)? {
        Some(query) => store.run_related_query(&query),
        None => Ok(Vec::new()),
    }
}
