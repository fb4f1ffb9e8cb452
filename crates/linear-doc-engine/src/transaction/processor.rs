//! Applying transactions to documents, and inverting them.
//!
//! Application runs in two phases. The planner walks the operations against
//! the untouched document, validating each one and recording splices. Only
//! when every operation has been checked are the splices executed, so a
//! failed apply leaves the document exactly as it was.

use crate::error::ConsistencyError;
use crate::model::{Annotation, AnnotationId, Document, Element, Item, MetaList, Range};

use super::{AnnotationBias, AnnotationMethod, Operation, Transaction};

/// What an applied transaction changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Ranges of the resulting document whose items were written, in order.
    pub changed: Vec<Range>,
    pub metadata_changed: bool,
    pub length_difference: isize,
    /// Document version after the change.
    pub version: u64,
}

struct Splice {
    at: usize,
    remove: usize,
    insert: Vec<Item>,
    result_at: usize,
}

struct MetaSplice {
    at: usize,
    remove: usize,
    insert: Vec<MetaList>,
    /// False when only empty lists were added or dropped to follow content.
    changed: bool,
}

struct ActiveAnnotation {
    method: AnnotationMethod,
    annotation: Annotation,
    id: Option<AnnotationId>,
}

/// Metadata lists rewritten since `from`, plus the list at the cursor.
#[derive(Default)]
struct MetaRegion {
    dirty: bool,
    from: usize,
    out: Vec<MetaList>,
    pending: MetaList,
    position: usize,
}

struct Planner<'a> {
    doc: &'a Document,
    cursor: usize,
    result_cursor: usize,
    splices: Vec<Splice>,
    meta_splices: Vec<MetaSplice>,
    meta: MetaRegion,
    /// The item at the cursor after an attribute change, not yet consumed.
    retouched: Option<Item>,
    active: Vec<ActiveAnnotation>,
    new_annotations: Vec<Annotation>,
}

impl<'a> Planner<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            cursor: 0,
            result_cursor: 0,
            splices: Vec::new(),
            meta_splices: Vec::new(),
            meta: MetaRegion::default(),
            retouched: None,
            active: Vec::new(),
            new_annotations: Vec::new(),
        }
    }

    fn source(&self, offset: usize) -> Option<Item> {
        match &self.retouched {
            Some(item) if offset == self.cursor => Some(item.clone()),
            _ => self.doc.item(offset).cloned(),
        }
    }

    fn plan(&mut self, op: &Operation) -> Result<(), ConsistencyError> {
        log::trace!("Planning {op:?} at offset {}", self.cursor);
        match op {
            Operation::Retain { length } => self.retain(*length),
            Operation::Replace {
                remove,
                insert,
                retain_metadata,
                remove_metadata,
                insert_metadata,
            } => self.replace(
                remove,
                insert,
                retain_metadata.unwrap_or(0),
                remove_metadata.as_deref(),
                insert_metadata.as_deref(),
            ),
            Operation::Attribute { key, from, to } => self.attribute(key, from, to),
            Operation::Annotate {
                method,
                bias,
                annotation,
            } => self.annotate(*method, *bias, annotation),
            Operation::RetainMetadata { length } => self.retain_metadata(*length),
            Operation::ReplaceMetadata { remove, insert } => self.replace_metadata(remove, insert),
        }
    }

    fn retain(&mut self, length: usize) -> Result<(), ConsistencyError> {
        if self.cursor + length > self.doc.len() {
            return Err(ConsistencyError::PastEnd(self.cursor));
        }
        if length == 0 {
            return Ok(());
        }
        self.flush_metadata();
        if !self.active.is_empty() {
            let mut items = Vec::with_capacity(length);
            for offset in self.cursor..self.cursor + length {
                items.push(self.annotated(offset)?);
            }
            self.retouched = None;
            self.modify(length, items);
        } else if let Some(item) = self.retouched.take() {
            self.modify(1, vec![item]);
            self.advance(length - 1);
        } else {
            self.advance(length);
        }
        Ok(())
    }

    fn annotated(&self, offset: usize) -> Result<Item, ConsistencyError> {
        let mut item = self
            .source(offset)
            .ok_or(ConsistencyError::PastEnd(offset))?;
        if let Some(annotations) = item.annotations_mut() {
            for active in &self.active {
                let changed = match (active.method, active.id) {
                    (AnnotationMethod::Set, Some(id)) => annotations.insert(id),
                    (AnnotationMethod::Clear, Some(id)) => annotations.remove(id),
                    (AnnotationMethod::Clear, None) | (AnnotationMethod::Set, None) => false,
                };
                if !changed {
                    return Err(match active.method {
                        AnnotationMethod::Set => ConsistencyError::AlreadyAnnotated(offset),
                        AnnotationMethod::Clear => ConsistencyError::NotAnnotated(offset),
                    });
                }
            }
        }
        Ok(item)
    }

    fn replace(
        &mut self,
        remove: &[Item],
        insert: &[Item],
        retain_metadata: usize,
        remove_metadata: Option<&[MetaList]>,
        insert_metadata: Option<&[MetaList]>,
    ) -> Result<(), ConsistencyError> {
        let at = self.cursor;
        if !self.active.is_empty() {
            return Err(ConsistencyError::ReplaceWhileAnnotating(at));
        }
        if at + remove.len() > self.doc.len() {
            return Err(ConsistencyError::PastEnd(at));
        }
        for (k, expected) in remove.iter().enumerate() {
            if self.source(at + k).as_ref() != Some(expected) {
                return Err(ConsistencyError::RemoveMismatch(at + k));
            }
        }
        if !remove.is_empty() {
            self.retouched = None;
        }

        self.ensure_metadata();
        self.meta.position = 0;
        let mut affected = vec![std::mem::take(&mut self.meta.pending)];
        affected.extend_from_slice(&self.doc.metadata()[at + 1..=at + remove.len()]);

        let mut results = match remove_metadata {
            None => {
                let mut results = vec![affected.concat()];
                results.extend(std::iter::repeat_n(Vec::new(), insert.len()));
                results
            }
            Some(expected) => {
                let end = retain_metadata + expected.len();
                if end > affected.len() || affected[retain_metadata..end] != *expected {
                    return Err(ConsistencyError::MetadataMismatch(at));
                }
                let mut results = affected[..retain_metadata].to_vec();
                results.extend_from_slice(insert_metadata.unwrap_or_default());
                results.extend_from_slice(&affected[end..]);
                results
            }
        };
        if results.len() != insert.len() + 1 {
            return Err(ConsistencyError::MetadataShape {
                offset: at,
                expected: insert.len() + 1,
                found: results.len(),
            });
        }
        self.meta.pending = results.pop().unwrap_or_default();
        self.meta.out.extend(results);

        self.modify(remove.len(), insert.to_vec());
        Ok(())
    }

    fn attribute(
        &mut self,
        key: &str,
        from: &Option<serde_json::Value>,
        to: &Option<serde_json::Value>,
    ) -> Result<(), ConsistencyError> {
        let Some(Item::Open(mut element)) = self.source(self.cursor) else {
            return Err(ConsistencyError::AttributeTarget(self.cursor));
        };
        if element.attributes.get(key) != from.as_ref() {
            return Err(ConsistencyError::AttributeMismatch {
                offset: self.cursor,
                key: key.to_string(),
            });
        }
        match to {
            Some(value) => {
                element.attributes.insert(key.to_string(), value.clone());
            }
            None => {
                element.attributes.remove(key);
            }
        }
        self.retouched = Some(Item::Open(element));
        Ok(())
    }

    fn annotate(
        &mut self,
        method: AnnotationMethod,
        bias: AnnotationBias,
        annotation: &Annotation,
    ) -> Result<(), ConsistencyError> {
        match bias {
            AnnotationBias::Start => {
                let id = match method {
                    AnnotationMethod::Set => Some(self.intern(annotation)),
                    AnnotationMethod::Clear => self.lookup(annotation),
                };
                self.active.push(ActiveAnnotation {
                    method,
                    annotation: annotation.clone(),
                    id,
                });
            }
            AnnotationBias::Stop => {
                let index = self
                    .active
                    .iter()
                    .position(|a| a.method == method && a.annotation == *annotation)
                    .ok_or(ConsistencyError::UnmatchedAnnotationStop(self.cursor))?;
                self.active.remove(index);
            }
        }
        Ok(())
    }

    fn lookup(&self, annotation: &Annotation) -> Option<AnnotationId> {
        self.doc.store().lookup(annotation).or_else(|| {
            self.new_annotations
                .iter()
                .position(|a| a == annotation)
                .map(|i| AnnotationId(self.doc.store().len() + i))
        })
    }

    /// Ids for values not yet in the store are handed out in the order they
    /// will be interned on commit.
    fn intern(&mut self, annotation: &Annotation) -> AnnotationId {
        if let Some(id) = self.lookup(annotation) {
            return id;
        }
        self.new_annotations.push(annotation.clone());
        AnnotationId(self.doc.store().len() + self.new_annotations.len() - 1)
    }

    fn retain_metadata(&mut self, length: usize) -> Result<(), ConsistencyError> {
        let available = if self.meta.dirty {
            self.meta.pending.len()
        } else {
            self.doc.metadata_at(self.cursor).len()
        };
        self.meta.position += length;
        if self.meta.position > available {
            return Err(ConsistencyError::MetadataOutOfBounds(self.cursor));
        }
        Ok(())
    }

    fn replace_metadata(
        &mut self,
        remove: &[Element],
        insert: &[Element],
    ) -> Result<(), ConsistencyError> {
        self.ensure_metadata();
        let start = self.meta.position;
        let end = start + remove.len();
        if end > self.meta.pending.len() {
            return Err(ConsistencyError::MetadataOutOfBounds(self.cursor));
        }
        if self.meta.pending[start..end] != *remove {
            return Err(ConsistencyError::MetadataMismatch(self.cursor));
        }
        self.meta.pending.splice(start..end, insert.iter().cloned());
        self.meta.position += insert.len();
        Ok(())
    }

    fn ensure_metadata(&mut self) {
        if !self.meta.dirty {
            self.meta.dirty = true;
            self.meta.from = self.cursor;
            self.meta.out.clear();
            self.meta.pending = self.doc.metadata_at(self.cursor).to_vec();
        }
    }

    fn flush_metadata(&mut self) {
        self.meta.position = 0;
        if !self.meta.dirty {
            return;
        }
        self.meta.dirty = false;
        let mut insert = std::mem::take(&mut self.meta.out);
        insert.push(std::mem::take(&mut self.meta.pending));
        let removed = &self.doc.metadata()[self.meta.from..=self.cursor];
        let all_empty = |lists: &[MetaList]| lists.iter().all(Vec::is_empty);
        let changed = removed != insert.as_slice() && !(all_empty(removed) && all_empty(&insert));
        self.meta_splices.push(MetaSplice {
            at: self.meta.from,
            remove: removed.len(),
            insert,
            changed,
        });
    }

    fn modify(&mut self, remove: usize, insert: Vec<Item>) {
        if remove == 0 && insert.is_empty() {
            return;
        }
        let inserted = insert.len();
        match self.splices.last_mut() {
            Some(last) if last.at + last.remove == self.cursor => {
                last.remove += remove;
                last.insert.extend(insert);
            }
            _ => self.splices.push(Splice {
                at: self.cursor,
                remove,
                insert,
                result_at: self.result_cursor,
            }),
        }
        self.cursor += remove;
        self.result_cursor += inserted;
    }

    fn advance(&mut self, length: usize) {
        self.cursor += length;
        self.result_cursor += length;
    }

    fn finish(&mut self) -> Result<(), ConsistencyError> {
        if !self.active.is_empty() {
            return Err(ConsistencyError::UnclosedAnnotation);
        }
        if self.cursor != self.doc.len() {
            return Err(ConsistencyError::LengthMismatch {
                covered: self.cursor,
                len: self.doc.len(),
            });
        }
        self.flush_metadata();
        Ok(())
    }
}

/// Apply `transaction` to `doc` in place.
///
/// Every operation is validated against the live document before anything is
/// written; on error the document is untouched.
pub fn apply(doc: &mut Document, transaction: &Transaction) -> Result<Patch, ConsistencyError> {
    let mut planner = Planner::new(doc);
    for op in transaction.operations() {
        planner.plan(op)?;
    }
    planner.finish()?;

    let Planner {
        splices,
        meta_splices,
        new_annotations,
        ..
    } = planner;

    let changed: Vec<Range> = splices
        .iter()
        .map(|s| Range::new(s.result_at, s.result_at + s.insert.len()))
        .collect();
    let metadata_changed = meta_splices.iter().any(|s| s.changed);

    for annotation in new_annotations {
        doc.intern(annotation);
    }
    for splice in splices.into_iter().rev() {
        doc.splice(splice.at, splice.remove, splice.insert);
    }
    for splice in meta_splices.into_iter().rev() {
        doc.splice_metadata(splice.at, splice.remove, splice.insert);
    }
    let version = doc.bump_version();
    let length_difference = transaction.length_difference();

    log::debug!(
        "Applied transaction: {} operations, {} changed ranges, length difference {}, version {}",
        transaction.operations().len(),
        changed.len(),
        length_difference,
        version
    );

    Ok(Patch {
        changed,
        metadata_changed,
        length_difference,
        version,
    })
}

/// The transaction that undoes `transaction` when applied to its result.
pub fn invert(transaction: &Transaction) -> Transaction {
    Transaction::from_operations(
        transaction
            .operations()
            .iter()
            .map(Operation::inverted)
            .collect(),
    )
}
