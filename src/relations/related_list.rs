//! The curated related-products list stored on each entity

use super::EntityId;
use crate::error::Result;
use crate::store::AttributeStore;
use serde::Serialize;
use serde_json::Value;

/// Attribute key the list is stored under
pub const RELATED_IDS_KEY: &str = "_related_ids";

/// Ordered list of entity IDs curated as related to one entity
///
/// Duplicates are kept as written. An empty list and an absent attribute mean
/// the same thing to every decision; reads return `Option<RelatedList>` so the
/// two can still be told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelatedList(Vec<EntityId>);

impl RelatedList {
    /// Sanitize submitted form values, returning the list and the rejected inputs
    ///
    /// A value is accepted when it parses as an integer greater than zero.
    pub fn from_submitted<S: AsRef<str>>(values: &[S]) -> (Self, Vec<String>) {
        let mut ids = Vec::with_capacity(values.len());
        let mut dropped = Vec::new();

        for value in values {
            match parse_submitted_id(value.as_ref()) {
                Some(id) => ids.push(id),
                None => dropped.push(value.as_ref().to_string()),
            }
        }

        (Self(ids), dropped)
    }

    /// Coerce a stored attribute value into a list
    ///
    /// Entries become their absolute integer value; zeros and entries with no
    /// leading integer are dropped. A scalar is read as a one-element list.
    pub fn from_stored(value: &Value) -> Self {
        let ids = match value {
            Value::Array(items) => items.iter().filter_map(coerce_stored_id).collect(),
            Value::Null => Vec::new(),
            scalar => coerce_stored_id(scalar).into_iter().collect(),
        };
        Self(ids)
    }

    /// Read an entity's list; `None` when the attribute was never set
    pub fn load<S: AttributeStore + ?Sized>(store: &S, entity: EntityId) -> Result<Option<Self>> {
        Ok(store
            .get_attribute(entity, RELATED_IDS_KEY)?
            .map(|value| Self::from_stored(&value)))
    }

    /// Read an entity's list, treating an absent attribute as empty
    pub fn load_or_empty<S: AttributeStore + ?Sized>(store: &S, entity: EntityId) -> Result<Self> {
        Ok(Self::load(store, entity)?.unwrap_or_default())
    }

    /// Replace the entity's stored list in full
    pub fn store<S: AttributeStore + ?Sized>(&self, store: &mut S, entity: EntityId) -> Result<()> {
        store.set_attribute(entity, RELATED_IDS_KEY, &self.to_value())
    }

    /// Remove the entity's list entirely
    pub fn clear<S: AttributeStore + ?Sized>(store: &mut S, entity: EntityId) -> Result<()> {
        store.delete_attribute(entity, RELATED_IDS_KEY)
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(|id| Value::from(id.get())).collect())
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.0
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    pub fn push(&mut self, id: EntityId) {
        self.0.push(id);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }
}

/// True when an entity carries explicit relations
pub fn is_curated(list: Option<&RelatedList>) -> bool {
    list.is_some_and(|list| !list.is_empty())
}

/// Submitted values must be whole positive integers
///
/// Stricter than [`coerce_stored_id`] on purpose: a form value like "4.5" or
/// "12abc" is rejected and reported, while the same text already in storage
/// is read leniently.
fn parse_submitted_id(value: &str) -> Option<EntityId> {
    let n: i64 = value.trim().parse().ok()?;
    if n > 0 {
        EntityId::new(n.unsigned_abs())
    } else {
        None
    }
}

fn coerce_stored_id(value: &Value) -> Option<EntityId> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(i64::unsigned_abs))
            .or_else(|| n.as_f64().map(|f| f.trunc().abs() as u64))?,
        Value::String(s) => leading_integer(s)?,
        _ => return None,
    };
    EntityId::new(n)
}

/// Absolute value of the integer a string starts with, after optional whitespace and sign
fn leading_integer(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}
