//! Structural well-formedness of linear data.
//!
//! [`validate`] reports the first violation as an error. It runs when a
//! document is loaded and, in hosts that ask for it, after every applied
//! transaction. Tests use `check`, which panics instead.

use crate::error::DocumentError;

#[cfg(test)]
use super::document::Document;
use super::item::{Item, MetaList};
use super::nodes::NodeType;

pub fn validate(
    data: &[Item],
    metadata: &[MetaList],
    annotation_count: usize,
) -> Result<(), DocumentError> {
    if metadata.len() != data.len() + 1 {
        return Err(DocumentError::MetadataLength {
            expected: data.len() + 1,
            found: metadata.len(),
        });
    }
    for element in metadata.iter().flatten() {
        if !element.node_type.is_meta() {
            return Err(DocumentError::NotMetadata(element.node_type));
        }
    }

    let mut stack: Vec<NodeType> = Vec::new();
    for (offset, item) in data.iter().enumerate() {
        let parent = stack.last().copied().unwrap_or(NodeType::Document);
        if let Some(annotations) = item.annotations() {
            if let Some(id) = annotations.iter().find(|id| id.0 >= annotation_count) {
                return Err(DocumentError::UnknownAnnotation {
                    offset,
                    index: id.0,
                });
            }
        }
        match item {
            Item::Char { .. } => {
                if !parent.can_contain_content() {
                    return Err(DocumentError::IllegalNesting {
                        offset,
                        parent,
                        child: "text".to_string(),
                    });
                }
            }
            Item::Open(element) => {
                let child = element.node_type;
                if child == NodeType::Document || child.is_meta() {
                    return Err(DocumentError::IllegalNesting {
                        offset,
                        parent,
                        child: child.to_string(),
                    });
                }
                let placement_ok = child.is_content() == parent.can_contain_content();
                if !placement_ok || !parent.allows_child(child) || !child.allows_parent(parent) {
                    return Err(DocumentError::IllegalNesting {
                        offset,
                        parent,
                        child: child.to_string(),
                    });
                }
                stack.push(child);
            }
            Item::Close(node_type) => match stack.pop() {
                Some(open) if open == *node_type => {}
                Some(open) => {
                    return Err(DocumentError::Unbalanced {
                        offset,
                        reason: format!("{node_type} closes an open {open}"),
                    });
                }
                None => {
                    return Err(DocumentError::Unbalanced {
                        offset,
                        reason: format!("{node_type} closed but never opened"),
                    });
                }
            },
        }
    }
    if let Some(open) = stack.last() {
        return Err(DocumentError::Unbalanced {
            offset: data.len(),
            reason: format!("{open} is never closed"),
        });
    }
    Ok(())
}

/// Panic with a description of the first structural violation.
#[cfg(test)]
pub fn check(doc: &Document) {
    if let Err(err) = validate(doc.data(), doc.metadata(), doc.store().len()) {
        panic!("document invariant violated: {err}");
    }
}
