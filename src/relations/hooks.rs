//! Decision and filter callbacks registered against the host's extension points

use super::related_list::is_curated;
use super::settings::{EmptyBehavior, Settings};
use super::{EntityId, RelatedList, RelatedQuery, Taxonomy};
use crate::error::Result;
use crate::store::AttributeStore;
use serde::Serialize;
use tracing::debug;

/// Named extension points the host invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPoint {
    ForceDisplay,
    RelateByCategory,
    RelateByTag,
    RelatedQuery,
}

impl ExtensionPoint {
    pub const ALL: [ExtensionPoint; 4] = [
        ExtensionPoint::ForceDisplay,
        ExtensionPoint::RelateByCategory,
        ExtensionPoint::RelateByTag,
        ExtensionPoint::RelatedQuery,
    ];

    pub fn hook_name(self) -> &'static str {
        match self {
            Self::ForceDisplay => "product_related_posts_force_display",
            Self::RelateByCategory => "product_related_posts_relate_by_category",
            Self::RelateByTag => "product_related_posts_relate_by_tag",
            Self::RelatedQuery => "product_related_posts_query",
        }
    }

    /// Query filtering runs after other filters so it sees their clauses
    pub fn priority(self) -> i32 {
        match self {
            Self::RelatedQuery => 20,
            _ => 10,
        }
    }

    /// Taxonomy a relevance extension point decides for
    pub fn taxonomy(self) -> Option<Taxonomy> {
        match self {
            Self::RelateByCategory => Some(Taxonomy::Category),
            Self::RelateByTag => Some(Taxonomy::Tag),
            _ => None,
        }
    }
}

/// Force the related block to display when the entity has curated relations
pub fn force_display<S: AttributeStore + ?Sized>(
    store: &S,
    entity: EntityId,
    host_decision: bool,
) -> Result<bool> {
    let list = RelatedList::load(store, entity)?;
    let forced = is_curated(list.as_ref()) || host_decision;

    debug!(entity = %entity, host_decision, forced, "force display");
    Ok(forced)
}

/// Whether taxonomy overlap should still count toward relatedness
///
/// Curated relations replace taxonomy matching; with no relations and
/// `EmptyBehavior::None`, taxonomy matching is switched off too so nothing shows.
pub fn relate_by_taxonomy<S: AttributeStore + ?Sized>(
    store: &S,
    settings: &Settings,
    entity: EntityId,
    taxonomy: Taxonomy,
    host_flag: bool,
) -> Result<bool> {
    let list = RelatedList::load(store, entity)?;

    let suppressed =
        is_curated(list.as_ref()) || settings.empty_behavior == EmptyBehavior::None;
    let relevant = !suppressed && host_flag;

    debug!(entity = %entity, %taxonomy, host_flag, relevant, "taxonomy relevance");
    Ok(relevant)
}

/// Narrow the host's related query to the entity's curated IDs, if any
pub fn filter_related_query<S: AttributeStore + ?Sized>(
    store: &S,
    entity: EntityId,
    mut query: RelatedQuery,
) -> Result<RelatedQuery> {
    match RelatedList::load(store, entity)? {
        Some(list) if !list.is_empty() => {
            debug!(entity = %entity, count = list.len(), "restricting related query");
            query.restrict_to(list.iter().map(EntityId::get));
        }
        _ => {}
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn id(n: u64) -> EntityId {
        EntityId::new(n).unwrap()
    }

    fn store_with(entity: u64, related: &[&str]) -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let (list, _) = RelatedList::from_submitted(related);
        list.store(&mut store, id(entity)).unwrap();
        store
    }

    #[test]
    fn test_force_display_with_relations() {
        let store = store_with(1, &["2", "3"]);
        assert!(force_display(&store, id(1), false).unwrap());
        assert!(force_display(&store, id(1), true).unwrap());
    }

    #[test]
    fn test_force_display_passes_through() {
        let store = store_with(1, &[]);
        assert!(!force_display(&store, id(1), false).unwrap());
        assert!(force_display(&store, id(1), true).unwrap());

        // Never set at all
        assert!(!force_display(&store, id(2), false).unwrap());
        assert!(force_display(&store, id(2), true).unwrap());
    }

    #[test]
    fn test_taxonomy_off_with_relations() {
        let store = store_with(1, &["2"]);
        for behavior in [EmptyBehavior::Fallback, EmptyBehavior::None] {
            let settings = Settings {
                empty_behavior: behavior,
                reciprocate: false,
            };
            for taxonomy in Taxonomy::ALL {
                for host_flag in [true, false] {
                    assert!(!relate_by_taxonomy(&store, &settings, id(1), taxonomy, host_flag).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_taxonomy_off_when_empty_means_none() {
        let store = store_with(1, &[]);
        let settings = Settings {
            empty_behavior: EmptyBehavior::None,
            reciprocate: false,
        };
        for taxonomy in Taxonomy::ALL {
            assert!(!relate_by_taxonomy(&store, &settings, id(1), taxonomy, true).unwrap());
            assert!(!relate_by_taxonomy(&store, &settings, id(9), taxonomy, true).unwrap());
        }
    }

    #[test]
    fn test_taxonomy_passes_through_by_default() {
        let store = store_with(1, &[]);
        let settings = Settings::default();
        for taxonomy in Taxonomy::ALL {
            assert!(relate_by_taxonomy(&store, &settings, id(1), taxonomy, true).unwrap());
            assert!(!relate_by_taxonomy(&store, &settings, id(1), taxonomy, false).unwrap());
        }
    }

    #[test]
    fn test_query_restricted_to_relations() {
        let store = store_with(1, &["5", "9"]);
        let query = RelatedQuery::similar(&[id(1)], &[], &[], 5);

        let filtered = filter_related_query(&store, id(1), query.clone()).unwrap();
        assert!(filtered.where_clause.ends_with(" AND p.id IN ( 5,9 )"));
        assert_eq!(filtered.fields, query.fields);
    }

    #[test]
    fn test_query_untouched_without_relations() {
        let store = store_with(1, &[]);
        let query = RelatedQuery::similar(&[id(1)], &[3], &[], 5);

        assert_eq!(filter_related_query(&store, id(1), query.clone()).unwrap(), query);
        assert_eq!(filter_related_query(&store, id(2), query.clone()).unwrap(), query);
    }

    #[test]
    fn test_extension_points() {
        assert_eq!(ExtensionPoint::RelatedQuery.priority(), 20);
        assert_eq!(ExtensionPoint::ForceDisplay.priority(), 10);
        assert_eq!(ExtensionPoint::RelateByTag.taxonomy(), Some(Taxonomy::Tag));
        assert_eq!(ExtensionPoint::RelatedQuery.taxonomy(), None);
    }
}
