use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One image's text, keyed by the image's filename stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub id: String,
    pub text: String,
}

/// Ordered id -> text mapping for one run.
///
/// Order is insertion order. Inserting an id that is already present replaces
/// its text in place, so the entry keeps the position it was first seen at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    entries: IndexMap<String, String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `id`, returning the previous text if there was one.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.entries.insert(id.into(), text.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn entries(&self) -> Vec<TextEntry> {
        self.iter()
            .map(|(id, text)| TextEntry {
                id: id.to_string(),
                text: text.to_string(),
            })
            .collect()
    }
}

// Equality is order-sensitive: two batches with the same pairs in a different
// order are different documents.
impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for Batch {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Batch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for (id, text) in iter {
            batch.insert(id, text);
        }
        batch
    }
}
