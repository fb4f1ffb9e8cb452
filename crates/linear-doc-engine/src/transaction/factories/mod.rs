//! Transaction factories: whole transactions computed from an editing intent.
//!
//! Every factory reads the document it is given, never modifies it, and
//! returns a transaction covering the full document length.

mod annotation;
mod insertion;
mod metadata;
mod removal;
mod structure;

use crate::error::ValidationError;
use crate::model::{Document, Range};

pub use insertion::fixup_insertion;

pub(crate) fn check_offset(doc: &Document, offset: usize) -> Result<(), ValidationError> {
    if offset > doc.len() {
        return Err(ValidationError::OffsetOutOfBounds {
            offset,
            len: doc.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_range(doc: &Document, range: Range) -> Result<(), ValidationError> {
    if range.end() > doc.len() {
        return Err(ValidationError::RangeOutOfBounds {
            start: range.start(),
            end: range.end(),
            len: doc.len(),
        });
    }
    Ok(())
}
