//! The host's "find related products" query, as a set of modifiable clauses

use super::{EntityId, Taxonomy};
use serde::Serialize;

/// Related-products query
///
/// Clauses are plain SQL fragments joined in order by [`RelatedQuery::to_sql`].
/// Every value embedded in a fragment is an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedQuery {
    pub fields: String,
    pub join: String,
    pub where_clause: String,
    pub order: String,
    pub limits: String,
}

impl RelatedQuery {
    /// Published products other than `exclude` sharing any of the given terms
    ///
    /// With no terms at all the query is unconstrained by taxonomy.
    pub fn similar(exclude: &[EntityId], categories: &[u64], tags: &[u64], limit: usize) -> Self {
        let mut where_clause =
            String::from(" WHERE 1=1 AND p.status = 'publish'");

        if !exclude.is_empty() {
            where_clause.push_str(&format!(" AND p.id NOT IN ( {} )", join_ids(exclude.iter().map(|id| id.get()))));
        }

        let mut term_clauses = Vec::new();
        for (taxonomy, terms) in [(Taxonomy::Category, categories), (Taxonomy::Tag, tags)] {
            if !terms.is_empty() {
                term_clauses.push(format!(
                    "( t.taxonomy = '{}' AND t.term_id IN ( {} ) )",
                    taxonomy.as_str(),
                    join_ids(terms.iter().copied())
                ));
            }
        }
        if !term_clauses.is_empty() {
            where_clause.push_str(&format!(" AND ( {} )", term_clauses.join(" OR ")));
        }

        Self {
            fields: "SELECT DISTINCT p.id FROM products p".to_string(),
            join: " LEFT JOIN product_terms t ON t.product_id = p.id".to_string(),
            where_clause,
            order: " ORDER BY p.id".to_string(),
            limits: format!(" LIMIT {}", limit),
        }
    }

    /// Restrict results to exactly the given IDs
    pub fn restrict_to<I: IntoIterator<Item = u64>>(&mut self, ids: I) {
        self.where_clause
            .push_str(&format!(" AND p.id IN ( {} )", join_ids(ids)));
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.fields, self.join, self.where_clause, self.order, self.limits
        )
    }
}

fn join_ids<I: IntoIterator<Item = u64>>(ids: I) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
