use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::model::Recipe;

pub const MAX_CACHE_SIZE: usize = 5;

/// Generated recipes keyed by trimmed dish query, bounded by insertion order.
///
/// Inserting past [`MAX_CACHE_SIZE`] evicts the oldest key, never the key just
/// written. Reads do not refresh an entry's position, so this is FIFO rather
/// than LRU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCache {
    entries: Vec<(String, Recipe)>,
}

impl RecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &str) -> Option<&Recipe> {
        let query = query.trim();
        self.entries.iter().find(|(k, _)| k == query).map(|(_, r)| r)
    }

    /// Stores `recipe` under the trimmed `query` and returns the evicted key, if any.
    /// Re-inserting an existing key replaces it in place.
    pub fn insert(&mut self, query: &str, recipe: Recipe) -> Option<String> {
        let query = query.trim();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == query) {
            slot.1 = recipe;
            return None;
        }
        self.entries.push((query.to_string(), recipe));
        if self.entries.len() > MAX_CACHE_SIZE && self.entries[0].0 != query {
            return Some(self.entries.remove(0).0);
        }
        None
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

// Persisted as a JSON object whose member order is the insertion order.
impl Serialize for RecipeCache {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (query, recipe) in &self.entries {
            map.serialize_entry(query, recipe)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RecipeCache {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CacheVisitor;

        impl<'de> Visitor<'de> for CacheVisitor {
            type Value = RecipeCache;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of query to recipe")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut cache = RecipeCache::default();
                while let Some((query, recipe)) = access.next_entry::<String, Recipe>()? {
                    match cache.entries.iter_mut().find(|(k, _)| *k == query) {
                        Some(slot) => slot.1 = recipe,
                        None => cache.entries.push((query, recipe)),
                    }
                }
                Ok(cache)
            }
        }

        deserializer.deserialize_map(CacheVisitor)
    }
}
