use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use super::fixtures::*;
use super::{replace, retain};
use crate::model::{Document, Item, NodeType::*, Range};
use crate::transaction::{AnnotationBias, AnnotationMethod, Operation, Transaction};

fn abc() -> Document {
    Document::from_data(paragraph("abc")).unwrap()
}

fn abcghi() -> Document {
    Document::from_data(paragraph("abcghi")).unwrap()
}

enum Call {
    Retain(usize),
    Replace(Document, usize, usize, Vec<Item>),
}

fn build(calls: Vec<Call>) -> Transaction {
    let mut tx = Transaction::new();
    for call in calls {
        match call {
            Call::Retain(length) => tx.push_retain(length),
            Call::Replace(doc, offset, remove, insert) => {
                tx.push_replace(&doc, offset, remove, insert).unwrap()
            }
        }
    }
    tx
}

#[rstest]
#[case::insert(
    vec![Call::Replace(abc(), 0, 0, paragraph("abc"))],
    vec![replace(vec![], paragraph("abc"))],
    5
)]
#[case::multiple_insert(
    vec![
        Call::Replace(abc(), 0, 0, [Item::open(Paragraph)].into_iter().chain(Item::text("ab")).collect()),
        Call::Replace(abc(), 0, 0, vec![Item::char('c'), Item::close(Paragraph)]),
    ],
    vec![replace(vec![], paragraph("abc"))],
    5
)]
#[case::insert_and_retain(
    vec![Call::Retain(1), Call::Replace(abc(), 0, 0, Item::text("abc"))],
    vec![retain(1), replace(vec![], Item::text("abc"))],
    3
)]
#[case::remove(
    vec![Call::Replace(abc(), 0, 5, vec![])],
    vec![replace(paragraph("abc"), vec![])],
    -5
)]
#[case::multiple_remove(
    vec![Call::Replace(abc(), 0, 3, vec![]), Call::Replace(abc(), 3, 2, vec![])],
    vec![replace(paragraph("abc"), vec![])],
    -5
)]
#[case::retain_and_remove(
    vec![Call::Retain(1), Call::Replace(abc(), 1, 3, vec![])],
    vec![retain(1), replace(Item::text("abc"), vec![])],
    -3
)]
#[case::replace(
    vec![Call::Replace(abc(), 1, 3, Item::text("def"))],
    vec![replace(Item::text("abc"), Item::text("def"))],
    0
)]
#[case::multiple_replace(
    vec![
        Call::Replace(abcghi(), 1, 3, Item::text("def")),
        Call::Replace(abcghi(), 4, 3, Item::text("jkl")),
    ],
    vec![replace(Item::text("abcghi"), Item::text("defjkl"))],
    0
)]
fn push_replace(
    #[case] calls: Vec<Call>,
    #[case] expected: Vec<Operation>,
    #[case] difference: isize,
) {
    let tx = build(calls);
    assert_eq!(tx.operations(), expected.as_slice());
    assert_eq!(tx.length_difference(), difference);
}

#[test]
fn replace_over_metadata_carries_explicit_lists() {
    let doc = meta_doc();
    let mut tx = Transaction::new();
    tx.push_retain(3);
    tx.push_replace(&doc, 3, 0, Item::text("xy")).unwrap();
    assert_eq!(
        tx.operations()[1],
        replace(vec![], Item::text("xy")),
        "empty metadata lists need no explicit fields"
    );

    let mut tx = Transaction::new();
    tx.push_retain(6);
    tx.push_replace(&doc, 6, 2, vec![]).unwrap();
    let Operation::Replace {
        retain_metadata,
        remove_metadata,
        insert_metadata,
        ..
    } = &tx.operations()[1]
    else {
        panic!("expected a replace");
    };
    assert_eq!(*retain_metadata, Some(0));
    assert_eq!(
        remove_metadata.as_deref(),
        Some(&doc.metadata()[6..9])
    );
    assert_eq!(
        insert_metadata.as_deref(),
        Some(&[vec![comment_meta("foo")]][..])
    );
}

#[test]
fn replace_element_attributes_are_not_merged() {
    let mut tx = Transaction::new();
    tx.push_replace_element_attribute("style", Some(json!("bullet")), Some(json!("number")));
    tx.push_replace_element_attribute("level", Some(json!(1)), Some(json!(2)));
    assert_eq!(
        tx.operations(),
        &[
            Operation::Attribute {
                key: "style".to_string(),
                from: Some(json!("bullet")),
                to: Some(json!("number")),
            },
            Operation::Attribute {
                key: "level".to_string(),
                from: Some(json!(1)),
                to: Some(json!(2)),
            },
        ]
    );
    assert_eq!(tx.length_difference(), 0);
}

#[rstest]
#[case::start(AnnotationBias::Start)]
#[case::stop(AnnotationBias::Stop)]
fn annotating_pushes_one_operation_per_annotation(#[case] bias: AnnotationBias) {
    let mut tx = Transaction::new();
    for annotation in [bold(), italic()] {
        match bias {
            AnnotationBias::Start => tx.push_start_annotating(AnnotationMethod::Set, annotation),
            AnnotationBias::Stop => tx.push_stop_annotating(AnnotationMethod::Set, annotation),
        }
    }
    assert_eq!(
        tx.operations(),
        &[
            Operation::Annotate {
                method: AnnotationMethod::Set,
                bias,
                annotation: bold(),
            },
            Operation::Annotate {
                method: AnnotationMethod::Set,
                bias,
                annotation: italic(),
            },
        ]
    );
    assert!(!tx.is_noop());
}

/// `p ----defg---h- /p`, and a transaction inserting at 0, removing `defg`,
/// replacing `h` and appending at the end.
fn translation_fixture() -> Transaction {
    let doc = Document::from_data(paragraph("----defg---h-")).unwrap();
    let mut tx = Transaction::new();
    tx.push_replace(&doc, 0, 0, Item::text("abc")).unwrap();
    tx.push_retain(5);
    tx.push_replace(&doc, 5, 4, vec![]).unwrap();
    tx.push_retain(2);
    tx.push_start_annotating(AnnotationMethod::Set, bold());
    tx.push_retain(1);
    tx.push_replace(&doc, 12, 1, Item::text("ijklm")).unwrap();
    tx.push_retain(2);
    tx.push_replace(&doc, 15, 0, Item::text("nop")).unwrap();
    tx
}

/// Offset before, and its image as `(excluding, including)` insertions.
const FORWARD: &[(usize, (usize, usize))] = &[
    (0, (0, 3)),
    (1, (4, 4)),
    (2, (5, 5)),
    (3, (6, 6)),
    (4, (7, 7)),
    (5, (8, 8)),
    (6, (8, 8)),
    (7, (8, 8)),
    (8, (8, 8)),
    (9, (8, 8)),
    (10, (9, 9)),
    (11, (10, 10)),
    (12, (11, 11)),
    (13, (12, 16)),
    (14, (17, 17)),
    (15, (18, 21)),
    (16, (22, 22)),
];

const REVERSED: &[(usize, (usize, usize))] = &[
    (0, (0, 0)),
    (1, (0, 0)),
    (2, (0, 0)),
    (3, (0, 0)),
    (4, (1, 1)),
    (5, (2, 2)),
    (6, (3, 3)),
    (7, (4, 4)),
    (8, (5, 9)),
    (9, (10, 10)),
    (10, (11, 11)),
    (11, (12, 12)),
    (12, (13, 13)),
    (13, (13, 13)),
    (14, (13, 13)),
    (15, (13, 13)),
    (16, (13, 13)),
    (17, (14, 14)),
    (18, (15, 15)),
    (19, (15, 15)),
    (20, (15, 15)),
    (21, (15, 15)),
    (22, (16, 16)),
];

#[rstest]
#[case::forward(false, FORWARD)]
#[case::reversed(true, REVERSED)]
fn translate_offset(#[case] reversed: bool, #[case] mapping: &[(usize, (usize, usize))]) {
    let tx = translation_fixture();
    for &(offset, (excluding, including)) in mapping {
        assert_eq!(
            tx.translate_offset(offset, reversed, false),
            including,
            "offset {offset}"
        );
        assert_eq!(
            tx.translate_offset(offset, reversed, true),
            excluding,
            "offset {offset} excluding insertion"
        );
    }
}

#[rstest]
#[case::wrapped_range(Range::new(55, 61), Range::new(55, 67))]
#[case::plus_one_each_side(Range::new(54, 62), Range::new(54, 68))]
#[case::plus_one_on_left(Range::new(54, 61), Range::new(54, 67))]
#[case::plus_one_on_right(Range::new(55, 62), Range::new(55, 68))]
fn translate_range_around_a_wrap(#[case] before: Range, #[case] after: Range) {
    let doc = example_doc();
    let mut tx = Transaction::new();
    tx.push_retain(55);
    tx.push_replace(&doc, 55, 0, vec![list("number")]).unwrap();
    tx.push_replace(&doc, 55, 0, vec![Item::open(ListItem)]).unwrap();
    tx.push_retain(3);
    tx.push_replace(&doc, 58, 0, vec![Item::close(ListItem)]).unwrap();
    tx.push_replace(&doc, 58, 0, vec![Item::open(ListItem)]).unwrap();
    tx.push_retain(3);
    tx.push_replace(&doc, 61, 0, vec![Item::close(ListItem)]).unwrap();
    tx.push_replace(&doc, 61, 0, vec![Item::close(List)]).unwrap();

    assert_eq!(tx.translate_range(before, false), after);
    assert_eq!(tx.translate_range(before.flip(), false), after.flip());
}
