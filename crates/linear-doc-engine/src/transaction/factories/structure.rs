//! Structural edits: attribute changes, content branch conversion and
//! wrapping.

use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{Attributes, Document, Element, Item, Node, NodeCategory, NodeType, Range};
use crate::transaction::Transaction;

use super::{check_offset, check_range};

fn content_branches<'a>(node: &'a Node, range: Range, out: &mut Vec<&'a Node>) {
    for child in &node.children {
        if child.outer.start() > range.end() || child.outer.end() < range.start() {
            continue;
        }
        if child.node_type.category() == NodeCategory::ContentBranch {
            let inner = child.inner();
            if inner.start() <= range.end() && range.start() <= inner.end() {
                out.push(child);
            }
        } else {
            content_branches(child, range, out);
        }
    }
}

fn closings(openings: &[Element]) -> Vec<Item> {
    openings
        .iter()
        .rev()
        .map(|element| Item::Close(element.node_type))
        .collect()
}

fn openings(elements: Vec<Element>) -> Vec<Item> {
    elements.into_iter().map(Item::Open).collect()
}

fn expect_close(doc: &Document, offset: usize, expected: NodeType) -> Result<(), ValidationError> {
    match doc.item(offset) {
        Some(Item::Close(node_type)) if *node_type == expected => Ok(()),
        Some(item) => Err(ValidationError::UnwrapMismatch {
            offset,
            expected,
            found: describe(item),
        }),
        None => Err(ValidationError::StraddlingUnwrap(offset)),
    }
}

fn describe(item: &Item) -> String {
    match item {
        Item::Open(element) => element.node_type.to_string(),
        Item::Close(node_type) => format!("/{node_type}"),
        Item::Char { ch, .. } => format!("{ch:?}"),
    }
}

fn expect_type(doc: &Document, offset: usize, expected: NodeType) -> Result<(), ValidationError> {
    match doc.item(offset) {
        Some(Item::Open(element)) if element.node_type == expected => Ok(()),
        Some(item) => Err(ValidationError::UnwrapMismatch {
            offset,
            expected,
            found: describe(item),
        }),
        None => Err(ValidationError::StraddlingUnwrap(offset)),
    }
}

impl Transaction {
    /// Set attribute `key` of the element opened at `offset` to `to`, or
    /// remove it when `to` is `None`. The current value is read from `doc`.
    pub fn new_from_attribute_change(
        doc: &Document,
        offset: usize,
        key: &str,
        to: Option<Value>,
    ) -> Result<Transaction, ValidationError> {
        check_offset(doc, offset)?;
        let Some(Item::Open(element)) = doc.item(offset) else {
            return Err(ValidationError::NotAnOpeningElement(offset));
        };
        let from = element.attributes.get(key).cloned();
        let mut tx = Transaction::new();
        tx.push_retain(offset);
        tx.push_replace_element_attribute(key, from, to);
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }

    /// Change every content branch touched by `range` into `node_type`.
    ///
    /// Branches whose interior merely touches the range at one end count as
    /// touched. Branches that already have the target type and attributes are
    /// left alone.
    pub fn new_from_content_branch_conversion(
        doc: &Document,
        range: Range,
        node_type: NodeType,
        attributes: Attributes,
    ) -> Result<Transaction, ValidationError> {
        check_range(doc, range)?;
        if node_type.category() != NodeCategory::ContentBranch {
            return Err(ValidationError::NotAContentBranch(node_type));
        }

        let root = doc.outline();
        let mut branches = Vec::new();
        content_branches(&root, range.normalized(), &mut branches);

        let mut tx = Transaction::new();
        let mut offset = 0;
        for branch in branches {
            let Some(Item::Open(current)) = doc.item(branch.outer.start()) else {
                continue;
            };
            if current.node_type == node_type && current.attributes == attributes {
                continue;
            }
            let inner = branch.inner();
            tx.push_retain(branch.outer.start() - offset);
            tx.push_replace(
                doc,
                branch.outer.start(),
                1,
                vec![Item::Open(Element::with_attributes(
                    node_type,
                    attributes.clone(),
                ))],
            )?;
            tx.push_retain(inner.len());
            tx.push_replace(doc, inner.end(), 1, vec![Item::Close(node_type)])?;
            offset = branch.outer.end();
        }
        log::debug!("Content branch conversion to {node_type} over {range:?}");
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }

    /// Replace the wrappers around and inside `range`.
    ///
    /// `unwrap_outer` lists the elements opened directly before `range`,
    /// outermost first; they and their closings after `range` are replaced by
    /// `wrap_outer`. Each top-level node inside `range` has its leading
    /// `unwrap_each` elements replaced by `wrap_each` in the same way.
    pub fn new_from_wrap(
        doc: &Document,
        range: Range,
        unwrap_outer: &[NodeType],
        wrap_outer: Vec<Element>,
        unwrap_each: &[NodeType],
        wrap_each: Vec<Element>,
    ) -> Result<Transaction, ValidationError> {
        check_range(doc, range)?;
        let range = range.normalized();
        let outer_len = unwrap_outer.len();
        if range.start() < outer_len || range.end() + outer_len > doc.len() {
            return Err(ValidationError::StraddlingUnwrap(range.start()));
        }
        let outer_start = range.start() - outer_len;
        for (k, &expected) in unwrap_outer.iter().enumerate() {
            expect_type(doc, outer_start + k, expected)?;
        }
        for (k, &expected) in unwrap_outer.iter().rev().enumerate() {
            if doc.item(range.end() + k) != Some(&Item::Close(expected)) {
                return Err(ValidationError::StraddlingUnwrap(range.end() + k));
            }
        }

        let mut tx = Transaction::new();
        tx.push_retain(outer_start);
        let closing_outer = closings(&wrap_outer);
        tx.push_replace(doc, outer_start, outer_len, openings(wrap_outer))?;

        if unwrap_each.is_empty() && wrap_each.is_empty() {
            tx.push_retain(range.len());
        } else {
            let closing_each = closings(&wrap_each);
            let opening_each = openings(wrap_each);
            let mut depth = 0usize;
            let mut start = range.start();
            for offset in range.start()..range.end() {
                match doc.item(offset) {
                    Some(Item::Open(_)) => {
                        if depth == 0 {
                            for (k, &expected) in unwrap_each.iter().enumerate() {
                                expect_type(doc, offset + k, expected)?;
                            }
                            tx.push_replace(doc, offset, unwrap_each.len(), opening_each.clone())?;
                            start = offset + unwrap_each.len();
                        }
                        depth += 1;
                    }
                    Some(Item::Close(_)) => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            let end = offset + 1 - unwrap_each.len();
                            for (k, &expected) in unwrap_each.iter().rev().enumerate() {
                                expect_close(doc, end + k, expected)?;
                            }
                            tx.push_retain(end.saturating_sub(start));
                            tx.push_replace(doc, end, unwrap_each.len(), closing_each.clone())?;
                        }
                    }
                    Some(Item::Char { .. }) if depth == 0 => {
                        return Err(ValidationError::UnexpectedContent(offset));
                    }
                    _ => {}
                }
            }
        }

        tx.push_replace(doc, range.end(), outer_len, closing_outer)?;
        tx.push_retain(doc.len() - range.end() - outer_len);
        Ok(tx)
    }
}
