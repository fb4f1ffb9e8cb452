//! Read-only tree outline of linear data.

use super::item::Item;
use super::nodes::NodeType;
use super::range::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_type: NodeType,
    /// From the opening marker up to and including the closing marker.
    /// The root's outer range is the whole document.
    pub outer: Range,
    pub children: Vec<Node>,
}

impl Node {
    /// The range between the markers.
    pub fn inner(&self) -> Range {
        if self.node_type == NodeType::Document {
            self.outer
        } else {
            Range::new(self.outer.start() + 1, self.outer.end() - 1)
        }
    }
}

/// Build the node tree of balanced `data`. Characters are not represented;
/// only elements become nodes.
pub fn outline(data: &[Item]) -> Node {
    let mut stack: Vec<(NodeType, usize, Vec<Node>)> = vec![(NodeType::Document, 0, Vec::new())];
    for (offset, item) in data.iter().enumerate() {
        match item {
            Item::Char { .. } => {}
            Item::Open(element) => stack.push((element.node_type, offset, Vec::new())),
            Item::Close(_) => {
                if stack.len() < 2 {
                    continue;
                }
                let Some((node_type, start, children)) = stack.pop() else {
                    continue;
                };
                if let Some(parent) = stack.last_mut() {
                    parent.2.push(Node {
                        node_type,
                        outer: Range::new(start, offset + 1),
                        children,
                    });
                }
            }
        }
    }
    let children = stack.into_iter().next().map(|root| root.2).unwrap_or_default();
    Node {
        node_type: NodeType::Document,
        outer: Range::new(0, data.len()),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlines_nested_nodes() {
        let data = vec![
            Item::open(NodeType::Paragraph),
            Item::char('a'),
            Item::open(NodeType::Image),
            Item::close(NodeType::Image),
            Item::close(NodeType::Paragraph),
            Item::open(NodeType::AlienBlock),
            Item::close(NodeType::AlienBlock),
        ];
        let root = outline(&data);
        assert_eq!(root.inner(), Range::new(0, 7));
        assert_eq!(root.children.len(), 2);

        let paragraph = &root.children[0];
        assert_eq!(paragraph.outer, Range::new(0, 5));
        assert_eq!(paragraph.inner(), Range::new(1, 4));
        assert_eq!(paragraph.children[0].outer, Range::new(2, 4));
        assert_eq!(root.children[1].node_type, NodeType::AlienBlock);
    }
}
