//! Removal of a range, merging siblings left adjacent by the removal.

use crate::error::ValidationError;
use crate::model::{Document, Item, Node, NodeCategory, NodeType, Range};
use crate::transaction::Transaction;

use super::check_range;

/// A node picked out by a range.
struct Selected<'a> {
    node: &'a Node,
    /// `(type, opening offset)` of every ancestor below the root, outermost
    /// first, ending with the node itself.
    path: Vec<(NodeType, usize)>,
    /// `None` when the whole node is covered, else the covered part of its
    /// interior.
    range: Option<Range>,
}

fn is_leaf_like(node: &Node) -> bool {
    matches!(
        node.node_type.category(),
        NodeCategory::ContentBranch | NodeCategory::Leaf | NodeCategory::Content
    )
}

/// The part of `node`'s interior inside `range`, widened so that no inline
/// node is cut between its markers.
fn covered_inner(node: &Node, range: Range) -> Range {
    let inner = node.inner();
    let mut start = range.start().max(inner.start());
    let mut end = range.end().min(inner.end());
    for inline in &node.children {
        let outer = inline.outer;
        if start > outer.start() && start < outer.end() {
            start = outer.start();
        }
        if end > outer.start() && end < outer.end() {
            end = outer.end();
        }
    }
    Range::new(start, end)
}

fn select<'a>(
    node: &'a Node,
    range: Range,
    path: &mut Vec<(NodeType, usize)>,
    out: &mut Vec<Selected<'a>>,
) {
    for child in &node.children {
        let outer = child.outer;
        if range.start() >= outer.end() || range.end() <= outer.start() {
            continue;
        }
        path.push((child.node_type, outer.start()));
        if outer.start() >= range.start() && outer.end() <= range.end() {
            out.push(Selected {
                node: child,
                path: path.clone(),
                range: None,
            });
        } else if is_leaf_like(child) {
            out.push(Selected {
                node: child,
                path: path.clone(),
                range: Some(covered_inner(child, range)),
            });
        } else {
            select(child, range, path, out);
        }
        path.pop();
    }
}

/// Whether two nodes have the same types all the way up to a common ancestor.
fn can_merge(a: &[(NodeType, usize)], b: &[(NodeType, usize)]) -> bool {
    let mut a = a.iter().rev();
    let mut b = b.iter().rev();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => return true,
            (Some(x), Some(y)) if x.0 == y.0 => {}
            _ => return false,
        }
    }
}

/// Remove `start..end`, leaving internal node subtrees in place.
fn push_safe_removal(
    tx: &mut Transaction,
    doc: &Document,
    start: usize,
    end: usize,
) -> Result<(), ValidationError> {
    let mut remove_start = start;
    let mut retain_start = start;
    let mut depth = 0usize;
    for offset in start..end {
        let internal = match doc.item(offset) {
            Some(Item::Open(element)) if element.node_type.is_internal() => Some(true),
            Some(Item::Close(node_type)) if node_type.is_internal() => Some(false),
            _ => None,
        };
        match internal {
            Some(true) => {
                if depth == 0 {
                    tx.push_replace(doc, remove_start, offset - remove_start, Vec::new())?;
                    retain_start = offset;
                }
                depth += 1;
            }
            Some(false) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    tx.push_retain(offset + 1 - retain_start);
                    remove_start = offset + 1;
                }
            }
            None => {}
        }
    }
    tx.push_replace(doc, remove_start, end - remove_start, Vec::new())
}

impl Transaction {
    /// Remove `range` from `doc`.
    ///
    /// Nodes wholly inside the range are removed; content branches cut by it
    /// lose only the covered content. When the first and last nodes touched
    /// are of the same types up to a common ancestor, everything between is
    /// removed in one go, merging them. Internal nodes are never removed.
    pub fn new_from_removal(doc: &Document, range: Range) -> Result<Transaction, ValidationError> {
        check_range(doc, range)?;
        let mut tx = Transaction::new();
        if range.is_collapsed() {
            tx.push_retain(doc.len());
            return Ok(tx);
        }

        let root = doc.outline();
        let mut selection = Vec::new();
        select(&root, range.normalized(), &mut Vec::new(), &mut selection);
        let (Some(first), Some(last)) = (selection.first(), selection.last()) else {
            tx.push_retain(doc.len());
            return Ok(tx);
        };

        if can_merge(&first.path, &last.path) {
            let (start, end) = if first.range.is_none() && last.range.is_none() {
                (first.node.outer.start(), last.node.outer.end())
            } else {
                let span = |selected: &Selected<'_>| {
                    selected.range.unwrap_or_else(|| {
                        if selected.node.node_type.can_contain_content() {
                            selected.node.inner()
                        } else {
                            selected.node.outer
                        }
                    })
                };
                (span(first).start(), span(last).end())
            };
            log::debug!("Removal {range:?} merges into one replacement {start}..{end}");
            tx.push_retain(start);
            push_safe_removal(&mut tx, doc, start, end)?;
            tx.push_retain(doc.len() - end);
            return Ok(tx);
        }

        let mut offset = 0;
        let mut pending: Option<(usize, usize)> = None;
        for selected in &selection {
            let span = selected.range.unwrap_or(selected.node.outer);
            pending = match pending {
                None => Some((span.start(), span.end())),
                Some((start, end)) if end == span.start() => Some((start, span.end())),
                Some((start, end)) => {
                    tx.push_retain(start - offset);
                    push_safe_removal(&mut tx, doc, start, end)?;
                    offset = end;
                    Some((span.start(), span.end()))
                }
            };
        }
        if let Some((start, end)) = pending {
            tx.push_retain(start - offset);
            push_safe_removal(&mut tx, doc, start, end)?;
            offset = end;
        }
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }
}
