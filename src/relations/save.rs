//! Saving an entity's related products and reciprocating the selection

use super::settings::Settings;
use super::{EntityId, RelatedList};
use crate::error::Result;
use crate::store::AttributeStore;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a save did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReport {
    pub entity: EntityId,
    /// `None` when the attribute was deleted
    pub stored: Option<RelatedList>,
    /// Submitted values that were not positive integers
    pub dropped: Vec<String>,
    /// Entities that had this entity appended to their list
    pub reciprocated: Vec<EntityId>,
}

/// Persist an edit-form submission for `entity`
///
/// No submission field deletes the list. Otherwise the sanitized list replaces
/// the stored one, and with reciprocation enabled every accepted ID gets
/// `entity` appended to its own list. Reciprocation writes are independent: a
/// failure part way leaves the earlier ones applied.
pub fn save_related<S, V>(
    store: &mut S,
    settings: &Settings,
    entity: EntityId,
    submitted: Option<&[V]>,
) -> Result<SaveReport>
where
    S: AttributeStore + ?Sized,
    V: AsRef<str>,
{
    let Some(values) = submitted else {
        RelatedList::clear(store, entity)?;
        info!(entity = %entity, "related products cleared");
        return Ok(SaveReport {
            entity,
            stored: None,
            dropped: Vec::new(),
            reciprocated: Vec::new(),
        });
    };

    let (list, dropped) = RelatedList::from_submitted(values);
    if !dropped.is_empty() {
        warn!(entity = %entity, ?dropped, "ignoring invalid related product IDs");
    }

    list.store(store, entity)?;
    info!(entity = %entity, count = list.len(), "related products saved");

    let mut reciprocated = Vec::new();
    if settings.reciprocate {
        for related in list.iter() {
            if reciprocate(store, entity, related)? {
                reciprocated.push(related);
            }
        }
    }

    Ok(SaveReport {
        entity,
        stored: Some(list),
        dropped,
        reciprocated,
    })
}

/// Append `current` to `related`'s list unless already present
///
/// Returns whether a write happened.
pub fn reciprocate<S: AttributeStore + ?Sized>(
    store: &mut S,
    current: EntityId,
    related: EntityId,
) -> Result<bool> {
    let mut list = RelatedList::load_or_empty(store, related)?;

    if list.contains(current) {
        debug!(entity = %related, back_link = %current, "already reciprocated");
        return Ok(false);
    }

    list.push(current);
    list.store(store, related)?;
    info!(entity = %related, back_link = %current, "reciprocated relation");
    Ok(true)
}
