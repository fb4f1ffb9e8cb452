use serde::{Deserialize, Serialize};

use crate::error::{ConsistencyError, DocumentError};
use crate::transaction::{Transaction, processor};

use super::annotations::{Annotation, AnnotationId, AnnotationStore};
use super::invariants;
use super::item::{Element, Item, MetaList};
use super::nodes::NodeType;
use super::range::Range;
use super::tree::{self, Node};

/// Linear document: a flat run of items, one metadata list per offset and the
/// annotation store the items index into.
///
/// Reads are free for anyone. The only way to change a document is to apply a
/// [`Transaction`], which goes through [`processor::apply`] and bumps the
/// version.
///
/// ```rust
/// # use linear_doc_engine::{Document, Item, NodeType, Transaction};
/// let mut doc = Document::from_data(vec![
///     Item::open(NodeType::Paragraph),
///     Item::char('a'),
///     Item::close(NodeType::Paragraph),
/// ])
/// .unwrap();
///
/// let tx = Transaction::new_from_insertion(&doc, 2, Item::text("bc")).unwrap();
/// let patch = doc.apply(&tx).unwrap();
///
/// assert_eq!(patch.length_difference, 2);
/// assert_eq!(doc.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    data: Vec<Item>,
    metadata: Vec<MetaList>,
    store: AnnotationStore,
    version: u64,
}

#[derive(Deserialize)]
struct Persisted {
    data: Vec<Item>,
    #[serde(default)]
    metadata: Vec<MetaList>,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    data: &'a [Item],
    metadata: &'a [MetaList],
    annotations: &'a [Annotation],
}

impl Default for Document {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            metadata: vec![Vec::new()],
            store: AnnotationStore::new(),
            version: 0,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with empty metadata lists and no annotations.
    pub fn from_data(data: Vec<Item>) -> Result<Self, DocumentError> {
        let metadata = vec![Vec::new(); data.len() + 1];
        Self::from_parts(data, metadata, Vec::new())
    }

    /// Assemble and validate a document. Annotation indices in `data` refer to
    /// positions in `annotations`.
    pub fn from_parts(
        data: Vec<Item>,
        metadata: Vec<MetaList>,
        annotations: Vec<Annotation>,
    ) -> Result<Self, DocumentError> {
        invariants::validate(&data, &metadata, annotations.len())?;
        log::debug!(
            "Loaded document: {} items, {} annotations",
            data.len(),
            annotations.len()
        );
        Ok(Self {
            data,
            metadata,
            store: AnnotationStore::from_values(annotations),
            version: 0,
        })
    }

    /// Load the JSON persistence shape. A missing `metadata` array means every
    /// list is empty.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let persisted: Persisted = serde_json::from_slice(bytes)?;
        let metadata = if persisted.metadata.is_empty() {
            vec![Vec::new(); persisted.data.len() + 1]
        } else {
            persisted.metadata
        };
        Self::from_parts(persisted.data, metadata, persisted.annotations)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let persisted = PersistedRef {
            data: &self.data,
            metadata: &self.metadata,
            annotations: self.store.values(),
        };
        Ok(serde_json::to_vec_pretty(&persisted)?)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Incremented once per applied transaction.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn data(&self) -> &[Item] {
        &self.data
    }

    pub fn item(&self, offset: usize) -> Option<&Item> {
        self.data.get(offset)
    }

    /// Items in `range`, clamped to the document.
    pub fn slice(&self, range: Range) -> &[Item] {
        let end = range.end().min(self.data.len());
        let start = range.start().min(end);
        &self.data[start..end]
    }

    /// The nearest element enclosing `offset`, or the root.
    pub fn node_type_at(&self, offset: usize) -> NodeType {
        let mut depth = 0usize;
        for item in self.data[..offset.min(self.data.len())].iter().rev() {
            match item {
                Item::Close(_) => depth += 1,
                Item::Open(element) if depth == 0 => return element.node_type,
                Item::Open(_) => depth -= 1,
                Item::Char { .. } => {}
            }
        }
        NodeType::Document
    }

    /// Opening elements enclosing `offset`, outermost first.
    pub fn ancestors_at(&self, offset: usize) -> Vec<Element> {
        let mut stack = Vec::new();
        for item in &self.data[..offset.min(self.data.len())] {
            match item {
                Item::Open(element) => stack.push(element.clone()),
                Item::Close(_) => {
                    stack.pop();
                }
                Item::Char { .. } => {}
            }
        }
        stack
    }

    /// Tree outline of the current data.
    pub fn outline(&self) -> Node {
        tree::outline(&self.data)
    }

    pub fn metadata(&self) -> &[MetaList] {
        &self.metadata
    }

    /// Metadata elements at `offset`; empty when out of range.
    pub fn metadata_at(&self, offset: usize) -> &[Element] {
        self.metadata.get(offset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.store.get(id)
    }

    /// Apply `transaction` in place. See [`processor::apply`].
    pub fn apply(
        &mut self,
        transaction: &Transaction,
    ) -> Result<processor::Patch, ConsistencyError> {
        processor::apply(self, transaction)
    }

    /// Replace `remove` items at `offset`. No validation; the processor plans
    /// every splice against the untouched document first.
    pub(crate) fn splice(&mut self, offset: usize, remove: usize, insert: Vec<Item>) {
        self.data.splice(offset..offset + remove, insert);
    }

    pub(crate) fn splice_metadata(&mut self, offset: usize, remove: usize, insert: Vec<MetaList>) {
        self.metadata.splice(offset..offset + remove, insert);
    }

    pub(crate) fn intern(&mut self, annotation: Annotation) -> AnnotationId {
        self.store.intern(annotation)
    }

    pub(crate) fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}
