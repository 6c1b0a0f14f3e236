use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::TagMapError;

/// Index of a canonical tag within its [`TagSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(usize);

impl TagId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The canonical dialogue-act vocabulary in canonical iteration order.
///
/// The order is the order in which each canonical tag first appears in the
/// tag map resource. Majority votes resolve ties by this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
    index: HashMap<String, TagId>,
}

impl TagSet {
    /// Build a tag set from tags in canonical order; repeats keep their first position
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for tag in tags {
            set.insert(tag.into());
        }
        set
    }

    fn insert(&mut self, tag: String) -> TagId {
        if let Some(&id) = self.index.get(&tag) {
            return id;
        }
        let id = TagId(self.tags.len());
        self.index.insert(tag.clone(), id);
        self.tags.push(tag);
        id
    }

    /// Look up the id of a canonical tag
    pub fn id(&self, tag: &str) -> Option<TagId> {
        self.index.get(tag).copied()
    }

    /// Name of a canonical tag
    pub fn name(&self, id: TagId) -> &str {
        &self.tags[id.0]
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All tag ids in canonical order
    pub fn ids(&self) -> impl Iterator<Item = TagId> + '_ {
        (0..self.tags.len()).map(TagId)
    }

    /// All tag names in canonical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

/// Mapping from raw corpus labels to canonical tags.
///
/// Loaded once per run and shared immutably by every stage.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    entries: HashMap<String, TagId>,
    tags: TagSet,
}

impl TagMap {
    /// Build a tag map from (raw, canonical) pairs in resource order
    pub fn from_pairs<I, R, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: Into<String>,
        C: Into<String>,
    {
        let mut map = Self::default();
        for (raw, canonical) in pairs {
            let id = map.tags.insert(canonical.into());
            map.entries.insert(raw.into(), id);
        }
        map
    }

    /// Parse a JSON object of `raw tag -> canonical tag`, keeping key order
    pub fn from_json_str(json: &str) -> Result<Self, TagMapError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(object) = value else {
            return Err(TagMapError::NotAnObject);
        };
        if object.is_empty() {
            return Err(TagMapError::Empty);
        }

        let mut pairs = Vec::with_capacity(object.len());
        for (raw, canonical) in object {
            match canonical {
                Value::String(canonical) => pairs.push((raw, canonical)),
                _ => return Err(TagMapError::NonStringValue(raw)),
            }
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Load a tag map from a JSON file such as `acts.json`
    pub fn from_file(path: &Path) -> Result<Self, TagMapError> {
        let content = std::fs::read_to_string(path).map_err(|source| TagMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Canonical tag for an exact raw label
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(|&id| self.tags.name(id))
    }

    /// The canonical tag set derived from this map
    pub fn tag_set(&self) -> &TagSet {
        &self.tags
    }

    /// Number of raw labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
