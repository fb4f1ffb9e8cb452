//! Transactions: ordered operation lists describing one atomic edit.
//!
//! Builders append operations and merge them with the previous one where
//! possible, so a transaction is always the shortest list for its effect.
//! Factories in [`factories`] compute whole transactions from an intent.

pub mod factories;
pub mod operation;
pub mod processor;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{Annotation, Document, Element, Item, MetaList, Range};

pub use operation::{AnnotationBias, AnnotationMethod, Operation};
pub use processor::Patch;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    operations: Vec<Operation>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// True when applying changes nothing: only retains.
    pub fn is_noop(&self) -> bool {
        self.operations
            .iter()
            .all(|op| matches!(op, Operation::Retain { .. } | Operation::RetainMetadata { .. }))
    }

    /// The transaction undoing this one.
    pub fn reversed(&self) -> Transaction {
        processor::invert(self)
    }

    pub fn push_retain(&mut self, length: usize) {
        if length == 0 {
            return;
        }
        if let Some(Operation::Retain { length: last }) = self.operations.last_mut() {
            *last += length;
            return;
        }
        self.operations.push(Operation::Retain { length });
    }

    /// Replace `remove_length` items at `offset` with `insert`.
    ///
    /// The removed items are read from `doc`, so the caller only supplies the
    /// insertion. A replace directly following another replace is merged into
    /// it. The metadata fields are filled in whenever one of the affected
    /// metadata lists is non-empty.
    pub fn push_replace(
        &mut self,
        doc: &Document,
        offset: usize,
        remove_length: usize,
        insert: Vec<Item>,
    ) -> Result<(), ValidationError> {
        if remove_length == 0 && insert.is_empty() {
            return Ok(());
        }
        if offset + remove_length > doc.len() {
            return Err(ValidationError::InsufficientContent {
                offset,
                requested: remove_length,
                available: doc.len().saturating_sub(offset),
            });
        }

        let (start, remove_length, insert) = match self.operations.last() {
            Some(Operation::Replace {
                remove,
                insert: previous,
                ..
            }) if remove.len() <= offset => {
                let start = offset - remove.len();
                let mut combined = previous.clone();
                combined.extend(insert);
                let total = remove.len() + remove_length;
                self.operations.pop();
                (start, total, combined)
            }
            _ => (offset, remove_length, insert),
        };

        let remove = doc.slice(Range::new(start, start + remove_length)).to_vec();
        let affected = &doc.metadata()[start..=start + remove_length];
        let op = if affected.iter().all(Vec::is_empty) {
            Operation::replace(remove, insert)
        } else {
            let merged: MetaList = affected.iter().flatten().cloned().collect();
            let mut insert_metadata = vec![merged];
            insert_metadata.extend(std::iter::repeat_n(Vec::new(), insert.len()));
            Operation::Replace {
                remove,
                insert,
                retain_metadata: Some(0),
                remove_metadata: Some(affected.to_vec()),
                insert_metadata: Some(insert_metadata),
            }
        };
        self.operations.push(op);
        Ok(())
    }

    /// Change attribute `key` on the element at the cursor. `None` means
    /// absent.
    pub fn push_replace_element_attribute(
        &mut self,
        key: impl Into<String>,
        from: Option<Value>,
        to: Option<Value>,
    ) {
        self.operations.push(Operation::Attribute {
            key: key.into(),
            from,
            to,
        });
    }

    pub fn push_start_annotating(&mut self, method: AnnotationMethod, annotation: Annotation) {
        self.operations.push(Operation::Annotate {
            method,
            bias: AnnotationBias::Start,
            annotation,
        });
    }

    pub fn push_stop_annotating(&mut self, method: AnnotationMethod, annotation: Annotation) {
        self.operations.push(Operation::Annotate {
            method,
            bias: AnnotationBias::Stop,
            annotation,
        });
    }

    pub fn push_retain_metadata(&mut self, length: usize) {
        if length == 0 {
            return;
        }
        if let Some(Operation::RetainMetadata { length: last }) = self.operations.last_mut() {
            *last += length;
            return;
        }
        self.operations.push(Operation::RetainMetadata { length });
    }

    pub fn push_replace_metadata(&mut self, remove: Vec<Element>, insert: Vec<Element>) {
        if remove.is_empty() && insert.is_empty() {
            return;
        }
        self.operations
            .push(Operation::ReplaceMetadata { remove, insert });
    }

    /// Net change in content length when this transaction is applied.
    pub fn length_difference(&self) -> isize {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Replace { remove, insert, .. } => {
                    insert.len() as isize - remove.len() as isize
                }
                _ => 0,
            })
            .sum()
    }

    /// Map an offset in the document before this transaction to the document
    /// after it.
    ///
    /// With `reversed` the mapping runs the other way: insertions are treated
    /// as removals and vice versa. An offset on the boundary of an insertion
    /// lands after the inserted content unless `exclude_insertion` is set.
    pub fn translate_offset(&self, offset: usize, reversed: bool, exclude_insertion: bool) -> usize {
        let mut cursor = 0usize;
        let mut adjustment = 0isize;
        for op in &self.operations {
            match op {
                Operation::Retain { length } => {
                    if offset >= cursor && offset < cursor + length {
                        return shift(offset, adjustment);
                    }
                    cursor += length;
                }
                Operation::Replace { remove, insert, .. } => {
                    let (inserted, removed) = if reversed {
                        (remove.len(), insert.len())
                    } else {
                        (insert.len(), remove.len())
                    };
                    let previous = adjustment;
                    adjustment += inserted as isize - removed as isize;
                    if offset == cursor + removed {
                        if exclude_insertion && inserted > removed {
                            return shift(offset, previous);
                        }
                        return shift(offset, adjustment);
                    } else if offset == cursor {
                        if inserted == 0 {
                            return shift(cursor + removed, adjustment);
                        }
                        return shift(cursor, previous);
                    } else if offset > cursor && offset < cursor + removed {
                        return shift(cursor + removed, adjustment);
                    }
                    cursor += removed;
                }
                _ => {}
            }
        }
        shift(offset, adjustment)
    }

    /// Map both ends of `range`. The start never moves past an insertion at
    /// its boundary; the end does unless `exclude_insertion` is set. The
    /// range keeps its direction.
    pub fn translate_range(&self, range: Range, exclude_insertion: bool) -> Range {
        let start = self.translate_offset(range.start(), false, true);
        let end = self.translate_offset(range.end(), false, exclude_insertion);
        if range.is_backwards() {
            Range::new(end, start)
        } else {
            Range::new(start, end)
        }
    }
}

fn shift(offset: usize, adjustment: isize) -> usize {
    (offset as isize + adjustment).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;
    use pretty_assertions::assert_eq;

    fn paragraph(text: &str) -> Document {
        let mut data = vec![Item::open(NodeType::Paragraph)];
        data.extend(Item::text(text));
        data.push(Item::close(NodeType::Paragraph));
        Document::from_data(data).unwrap()
    }

    #[test]
    fn retains_coalesce() {
        let mut tx = Transaction::new();
        tx.push_retain(5);
        tx.push_retain(0);
        tx.push_retain(3);
        assert_eq!(tx.operations(), &[Operation::Retain { length: 8 }]);
        assert_eq!(tx.length_difference(), 0);
    }

    #[test]
    fn replace_beyond_end_fails() {
        let doc = paragraph("abc");
        let mut tx = Transaction::new();
        assert_eq!(
            tx.push_replace(&doc, 3, 4, vec![]),
            Err(ValidationError::InsufficientContent {
                offset: 3,
                requested: 4,
                available: 2
            })
        );
    }

    #[test]
    fn empty_replace_is_dropped() {
        let doc = paragraph("abc");
        let mut tx = Transaction::new();
        tx.push_replace(&doc, 1, 0, vec![]).unwrap();
        assert!(tx.is_empty());
    }

    #[test]
    fn metadata_retains_coalesce() {
        let mut tx = Transaction::new();
        tx.push_retain_metadata(2);
        tx.push_retain_metadata(1);
        tx.push_replace_metadata(vec![], vec![]);
        assert_eq!(tx.operations(), &[Operation::RetainMetadata { length: 3 }]);
        assert!(tx.is_noop());
    }
}
