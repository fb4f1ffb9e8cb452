//! Edits to the metadata list at one offset. Content is retained untouched.

use crate::error::ValidationError;
use crate::model::{Document, Element, Range};
use crate::transaction::Transaction;

use super::check_offset;

impl Transaction {
    /// Insert `elements` into the metadata list at `offset`, before `index`.
    pub fn new_from_metadata_insertion(
        doc: &Document,
        offset: usize,
        index: usize,
        elements: Vec<Element>,
    ) -> Result<Transaction, ValidationError> {
        check_offset(doc, offset)?;
        let len = doc.metadata_at(offset).len();
        if index > len {
            return Err(ValidationError::MetadataIndexOutOfBounds { offset, index, len });
        }
        let mut tx = Transaction::new();
        tx.push_retain(offset);
        tx.push_retain_metadata(index);
        tx.push_replace_metadata(Vec::new(), elements);
        tx.push_retain_metadata(len - index);
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }

    /// Remove the elements in `range` from the metadata list at `offset`.
    pub fn new_from_metadata_removal(
        doc: &Document,
        offset: usize,
        range: Range,
    ) -> Result<Transaction, ValidationError> {
        check_offset(doc, offset)?;
        let list = doc.metadata_at(offset);
        let range = range.normalized();
        if range.end() > list.len() {
            return Err(ValidationError::MetadataRangeOutOfBounds {
                offset,
                start: range.start(),
                end: range.end(),
                len: list.len(),
            });
        }
        let mut tx = Transaction::new();
        tx.push_retain(offset);
        tx.push_retain_metadata(range.start());
        tx.push_replace_metadata(list[range.as_std()].to_vec(), Vec::new());
        tx.push_retain_metadata(list.len() - range.end());
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }

    /// Replace the metadata element at `index` in the list at `offset`.
    pub fn new_from_metadata_element_replacement(
        doc: &Document,
        offset: usize,
        index: usize,
        element: Element,
    ) -> Result<Transaction, ValidationError> {
        check_offset(doc, offset)?;
        let list = doc.metadata_at(offset);
        let Some(previous) = list.get(index) else {
            return Err(ValidationError::MetadataIndexOutOfBounds {
                offset,
                index,
                len: list.len(),
            });
        };
        let mut tx = Transaction::new();
        tx.push_retain(offset);
        tx.push_retain_metadata(index);
        tx.push_replace_metadata(vec![previous.clone()], vec![element]);
        tx.push_retain_metadata(list.len() - index - 1);
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }
}
