use pretty_assertions::assert_eq;

use super::fixtures::*;
use super::retain;
use crate::error::ValidationError;
use crate::model::{Element, Range};
use crate::transaction::{Operation, Transaction};

fn retain_metadata(length: usize) -> Operation {
    Operation::RetainMetadata { length }
}

fn replace_metadata(remove: Vec<Element>, insert: Vec<Element>) -> Operation {
    Operation::ReplaceMetadata { remove, insert }
}

fn inline_comment() -> Element {
    alien_meta(" inline ")
}

#[test]
fn insertion_into_existing_list() {
    let mut doc = meta_doc();
    let tx = Transaction::new_from_metadata_insertion(&doc, 11, 2, vec![inline_comment()])
        .unwrap();
    assert_eq!(
        tx.operations(),
        &[
            retain(11),
            retain_metadata(2),
            replace_metadata(vec![], vec![inline_comment()]),
            retain_metadata(2),
        ]
    );

    let patch = doc.apply(&tx).unwrap();
    assert!(patch.metadata_changed);
    assert_eq!(patch.length_difference, 0);
    assert_eq!(doc.metadata_at(11).len(), 5);
    assert_eq!(doc.metadata_at(11)[2], inline_comment());
}

#[test]
fn insertion_into_empty_list() {
    let mut doc = meta_doc();
    let tx =
        Transaction::new_from_metadata_insertion(&doc, 3, 0, vec![inline_comment()]).unwrap();
    assert_eq!(
        tx.operations(),
        &[
            retain(3),
            replace_metadata(vec![], vec![inline_comment()]),
            retain(8),
        ]
    );
    doc.apply(&tx).unwrap();
    assert_eq!(doc.metadata_at(3), &[inline_comment()]);
}

#[test]
fn insertion_index_is_bounds_checked() {
    let doc = meta_doc();
    assert_eq!(
        Transaction::new_from_metadata_insertion(&doc, 11, 5, vec![inline_comment()]),
        Err(ValidationError::MetadataIndexOutOfBounds {
            offset: 11,
            index: 5,
            len: 4
        })
    );
}

#[test]
fn removal_of_whole_list() {
    let doc = meta_doc();
    let tx = Transaction::new_from_metadata_removal(&doc, 11, Range::new(0, 4)).unwrap();
    assert_eq!(
        tx.operations(),
        &[
            retain(11),
            replace_metadata(doc.metadata_at(11).to_vec(), vec![]),
        ]
    );
}

#[test]
fn removal_of_part_of_list() {
    let mut doc = meta_doc();
    let tx = Transaction::new_from_metadata_removal(&doc, 11, Range::new(1, 3)).unwrap();
    assert_eq!(
        tx.operations(),
        &[
            retain(11),
            retain_metadata(1),
            replace_metadata(doc.metadata_at(11)[1..3].to_vec(), vec![]),
            retain_metadata(1),
        ]
    );
    doc.apply(&tx).unwrap();
    assert_eq!(
        doc.metadata_at(11),
        &[alien_meta("one"), comment_meta("four")]
    );
}

#[test]
fn removal_from_empty_list_fails() {
    let doc = meta_doc();
    assert_eq!(
        Transaction::new_from_metadata_removal(&doc, 5, Range::new(1, 3)),
        Err(ValidationError::MetadataRangeOutOfBounds {
            offset: 5,
            start: 1,
            end: 3,
            len: 0
        })
    );
}

#[test]
fn removal_range_is_bounds_checked() {
    let doc = meta_doc();
    assert!(matches!(
        Transaction::new_from_metadata_removal(&doc, 11, Range::new(1, 5)),
        Err(ValidationError::MetadataRangeOutOfBounds { len: 4, .. })
    ));
}

#[test]
fn replacement_at_end_of_list() {
    let mut doc = meta_doc();
    let tx =
        Transaction::new_from_metadata_element_replacement(&doc, 11, 3, inline_comment()).unwrap();
    assert_eq!(
        tx.operations(),
        &[
            retain(11),
            retain_metadata(3),
            replace_metadata(vec![comment_meta("four")], vec![inline_comment()]),
        ]
    );
    doc.apply(&tx).unwrap();
    assert_eq!(doc.metadata_at(11)[3], inline_comment());

    doc.apply(&tx.reversed()).unwrap();
    assert_eq!(doc.metadata_at(11)[3], comment_meta("four"));
}

#[test]
fn replacement_offset_is_bounds_checked() {
    let doc = meta_doc();
    assert_eq!(
        Transaction::new_from_metadata_element_replacement(&doc, 15, 0, inline_comment()),
        Err(ValidationError::OffsetOutOfBounds { offset: 15, len: 11 })
    );
}

#[test]
fn replacement_index_is_bounds_checked() {
    let doc = meta_doc();
    assert_eq!(
        Transaction::new_from_metadata_element_replacement(&doc, 11, 5, inline_comment()),
        Err(ValidationError::MetadataIndexOutOfBounds {
            offset: 11,
            index: 5,
            len: 4
        })
    );
}

#[test]
fn stale_metadata_removal_is_rejected() {
    let mut doc = meta_doc();
    let tx = Transaction::new_from_metadata_removal(&doc, 7, Range::new(0, 1)).unwrap();
    doc.apply(&tx).unwrap();
    let version = doc.version();
    assert!(doc.apply(&tx).is_err());
    assert_eq!(doc.version(), version);
}
