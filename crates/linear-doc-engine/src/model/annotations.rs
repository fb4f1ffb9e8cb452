//! Annotation values and the append-only store that deduplicates them.
//!
//! Content items never hold annotation values directly. They hold
//! [`AnnotationId`]s into the document's [`AnnotationStore`], so two items
//! carry "the same" annotation exactly when they hold the same index.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A formatting span value such as `textStyle/bold` or a link with its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl Annotation {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Canonical hash key. `data` is ordered, so equal values give equal keys.
    fn store_key(&self) -> String {
        let data: serde_json::Map<String, Value> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        format!("{}\u{0}{}", self.kind, Value::Object(data))
    }
}

/// Index of an annotation inside an [`AnnotationStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub usize);

/// The annotations applied to one content item, kept sorted by index.
///
/// Sorting makes setting and then clearing an annotation restore the exact
/// previous set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<AnnotationId>", into = "Vec<AnnotationId>")]
pub struct AnnotationSet(Vec<AnnotationId>);

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns false when the annotation was already present.
    pub fn insert(&mut self, id: AnnotationId) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    /// Returns false when the annotation was not present.
    pub fn remove(&mut self, id: AnnotationId) -> bool {
        match self.0.binary_search(&id) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<AnnotationId>> for AnnotationSet {
    fn from(mut ids: Vec<AnnotationId>) -> Self {
        ids.sort();
        ids.dedup();
        Self(ids)
    }
}

impl From<AnnotationSet> for Vec<AnnotationId> {
    fn from(set: AnnotationSet) -> Self {
        set.0
    }
}

impl FromIterator<AnnotationId> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = AnnotationId>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

/// Append-only pool of annotation values.
///
/// Entries are never mutated or removed, so ids handed out stay valid for
/// the life of the document.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    values: Vec<Annotation>,
    index: HashMap<String, AnnotationId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted values, keeping their order so
    /// persisted ids stay meaningful.
    pub fn from_values(values: Vec<Annotation>) -> Self {
        let mut store = Self::new();
        for value in values {
            let key = value.store_key();
            let id = AnnotationId(store.values.len());
            store.index.entry(key).or_insert(id);
            store.values.push(value);
        }
        store
    }

    /// Return the id of an equal value, adding it if it is not stored yet.
    pub fn intern(&mut self, annotation: Annotation) -> AnnotationId {
        let key = annotation.store_key();
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = AnnotationId(self.values.len());
        self.values.push(annotation);
        self.index.insert(key, id);
        id
    }

    pub fn lookup(&self, annotation: &Annotation) -> Option<AnnotationId> {
        self.index.get(&annotation.store_key()).copied()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.values.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Annotation] {
        &self.values
    }
}
