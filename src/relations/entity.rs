//! Catalog entity identifiers and taxonomies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog product; always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Largest ID the catalog's signed integer keys can hold
    pub const MAX: u64 = i64::MAX as u64;

    /// Returns `None` for zero or anything above [`EntityId::MAX`]
    pub fn new(id: u64) -> Option<Self> {
        (1..=Self::MAX).contains(&id).then_some(Self(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a product ID", s))?;
        Self::new(id).ok_or_else(|| format!("product IDs range from 1 to {}", Self::MAX))
    }
}

/// Taxonomy the host's similarity algorithm can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 2] = [Taxonomy::Category, Taxonomy::Tag];

    /// Name stored in the catalog's term table
    pub fn as_str(self) -> &'static str {
        match self {
            Taxonomy::Category => "product_cat",
            Taxonomy::Tag => "product_tag",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Taxonomy::Category => write!(f, "category"),
            Taxonomy::Tag => write!(f, "tag"),
        }
    }
}
