use crate::error::ValidationError;
use crate::model::{Annotation, Document, Item, Range};
use crate::transaction::{AnnotationMethod, Transaction};

use super::check_range;

impl Transaction {
    /// Set or clear `annotation` on the content inside `range`.
    ///
    /// Only items that would actually change are covered: setting skips items
    /// that already carry the annotation, clearing skips items that don't.
    /// Structural markers end a run; closings of inline content don't.
    pub fn new_from_annotation(
        doc: &Document,
        range: Range,
        method: AnnotationMethod,
        annotation: Annotation,
    ) -> Result<Transaction, ValidationError> {
        check_range(doc, range)?;
        let range = range.normalized();
        let id = doc.store().lookup(&annotation);

        let mut tx = Transaction::new();
        let mut offset = 0;
        let mut annotating = false;
        for (i, item) in doc.slice(range).iter().enumerate() {
            let at = range.start() + i;
            let needs_change = match item.annotations() {
                Some(annotations) => {
                    let present = id.is_some_and(|id| annotations.contains(id));
                    match method {
                        AnnotationMethod::Set => !present,
                        AnnotationMethod::Clear => present,
                    }
                }
                None => {
                    if matches!(item, Item::Close(node_type) if node_type.is_content()) {
                        continue;
                    }
                    false
                }
            };
            if needs_change && !annotating {
                tx.push_retain(at - offset);
                tx.push_start_annotating(method, annotation.clone());
                offset = at;
                annotating = true;
            } else if !needs_change && annotating {
                tx.push_retain(at - offset);
                tx.push_stop_annotating(method, annotation.clone());
                offset = at;
                annotating = false;
            }
        }
        if annotating {
            tx.push_retain(range.end() - offset);
            tx.push_stop_annotating(method, annotation);
            offset = range.end();
        }
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }
}
