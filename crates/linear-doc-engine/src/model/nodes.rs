//! Static node type registry.
//!
//! Every node type the linear data can contain is a [`NodeType`] variant, and
//! its structural rules live in one [`NodeSpec`] table entry. Nothing is
//! registered at runtime.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::item::{Attributes, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    /// Implicit root. Never appears in linear data.
    Document,
    Paragraph,
    Heading,
    Preformatted,
    List,
    ListItem,
    Table,
    TableSection,
    TableRow,
    TableCell,
    DefinitionList,
    DefinitionListItem,
    Image,
    AlienBlock,
    AlienInline,
    InternalList,
    InternalItem,
    AlienMeta,
    CommentMeta,
}

/// How a node type participates in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Root,
    /// May contain other structural nodes.
    Branch,
    /// May contain only content.
    ContentBranch,
    /// Inline node living inside a content branch.
    Content,
    /// Structural node with no children.
    Leaf,
    /// Lives in metadata lists, never in the content stream.
    Meta,
}

#[derive(Debug)]
pub struct NodeSpec {
    pub name: &'static str,
    pub category: NodeCategory,
    /// `None` means any parent is legal.
    pub parents: Option<&'static [NodeType]>,
    /// `None` means any child is legal.
    pub children: Option<&'static [NodeType]>,
    /// Attributes given to an element of this type when it is synthesized.
    pub default_attributes: &'static [(&'static str, &'static str)],
    /// Bookkeeping nodes that removals never delete.
    pub internal: bool,
}

const NO_CHILDREN: Option<&[NodeType]> = Some(&[]);

const fn spec(name: &'static str, category: NodeCategory) -> NodeSpec {
    NodeSpec {
        name,
        category,
        parents: None,
        children: None,
        default_attributes: &[],
        internal: false,
    }
}

static DOCUMENT: NodeSpec = spec("document", NodeCategory::Root);
static PARAGRAPH: NodeSpec = spec("paragraph", NodeCategory::ContentBranch);
static HEADING: NodeSpec = spec("heading", NodeCategory::ContentBranch);
static PREFORMATTED: NodeSpec = spec("preformatted", NodeCategory::ContentBranch);
static LIST: NodeSpec = NodeSpec {
    children: Some(&[NodeType::ListItem]),
    default_attributes: &[("style", "bullet")],
    ..spec("list", NodeCategory::Branch)
};
static LIST_ITEM: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::List]),
    ..spec("listItem", NodeCategory::Branch)
};
static TABLE: NodeSpec = NodeSpec {
    children: Some(&[NodeType::TableSection]),
    ..spec("table", NodeCategory::Branch)
};
static TABLE_SECTION: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::Table]),
    children: Some(&[NodeType::TableRow]),
    default_attributes: &[("style", "body")],
    ..spec("tableSection", NodeCategory::Branch)
};
static TABLE_ROW: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::TableSection]),
    children: Some(&[NodeType::TableCell]),
    ..spec("tableRow", NodeCategory::Branch)
};
static TABLE_CELL: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::TableRow]),
    default_attributes: &[("style", "data")],
    ..spec("tableCell", NodeCategory::Branch)
};
static DEFINITION_LIST: NodeSpec = NodeSpec {
    children: Some(&[NodeType::DefinitionListItem]),
    ..spec("definitionList", NodeCategory::Branch)
};
static DEFINITION_LIST_ITEM: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::DefinitionList]),
    default_attributes: &[("style", "term")],
    ..spec("definitionListItem", NodeCategory::Branch)
};
static IMAGE: NodeSpec = NodeSpec {
    children: NO_CHILDREN,
    ..spec("image", NodeCategory::Content)
};
static ALIEN_BLOCK: NodeSpec = NodeSpec {
    children: NO_CHILDREN,
    ..spec("alienBlock", NodeCategory::Leaf)
};
static ALIEN_INLINE: NodeSpec = NodeSpec {
    children: NO_CHILDREN,
    ..spec("alienInline", NodeCategory::Content)
};
static INTERNAL_LIST: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::Document]),
    children: Some(&[NodeType::InternalItem]),
    internal: true,
    ..spec("internalList", NodeCategory::Branch)
};
static INTERNAL_ITEM: NodeSpec = NodeSpec {
    parents: Some(&[NodeType::InternalList]),
    internal: true,
    ..spec("internalItem", NodeCategory::Branch)
};
static ALIEN_META: NodeSpec = NodeSpec {
    children: NO_CHILDREN,
    ..spec("alienMeta", NodeCategory::Meta)
};
static COMMENT_META: NodeSpec = NodeSpec {
    children: NO_CHILDREN,
    ..spec("commentMeta", NodeCategory::Meta)
};

impl NodeType {
    pub const ALL: [NodeType; 19] = [
        NodeType::Document,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Preformatted,
        NodeType::List,
        NodeType::ListItem,
        NodeType::Table,
        NodeType::TableSection,
        NodeType::TableRow,
        NodeType::TableCell,
        NodeType::DefinitionList,
        NodeType::DefinitionListItem,
        NodeType::Image,
        NodeType::AlienBlock,
        NodeType::AlienInline,
        NodeType::InternalList,
        NodeType::InternalItem,
        NodeType::AlienMeta,
        NodeType::CommentMeta,
    ];

    pub fn spec(self) -> &'static NodeSpec {
        match self {
            NodeType::Document => &DOCUMENT,
            NodeType::Paragraph => &PARAGRAPH,
            NodeType::Heading => &HEADING,
            NodeType::Preformatted => &PREFORMATTED,
            NodeType::List => &LIST,
            NodeType::ListItem => &LIST_ITEM,
            NodeType::Table => &TABLE,
            NodeType::TableSection => &TABLE_SECTION,
            NodeType::TableRow => &TABLE_ROW,
            NodeType::TableCell => &TABLE_CELL,
            NodeType::DefinitionList => &DEFINITION_LIST,
            NodeType::DefinitionListItem => &DEFINITION_LIST_ITEM,
            NodeType::Image => &IMAGE,
            NodeType::AlienBlock => &ALIEN_BLOCK,
            NodeType::AlienInline => &ALIEN_INLINE,
            NodeType::InternalList => &INTERNAL_LIST,
            NodeType::InternalItem => &INTERNAL_ITEM,
            NodeType::AlienMeta => &ALIEN_META,
            NodeType::CommentMeta => &COMMENT_META,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn category(self) -> NodeCategory {
        self.spec().category
    }

    /// Inline content that sits inside content branches.
    pub fn is_content(self) -> bool {
        self.category() == NodeCategory::Content
    }

    pub fn can_contain_content(self) -> bool {
        self.category() == NodeCategory::ContentBranch
    }

    pub fn is_internal(self) -> bool {
        self.spec().internal
    }

    pub fn is_meta(self) -> bool {
        self.category() == NodeCategory::Meta
    }

    pub fn parent_types(self) -> Option<&'static [NodeType]> {
        self.spec().parents
    }

    pub fn child_types(self) -> Option<&'static [NodeType]> {
        self.spec().children
    }

    pub fn allows_parent(self, parent: NodeType) -> bool {
        self.parent_types().is_none_or(|parents| parents.contains(&parent))
    }

    pub fn allows_child(self, child: NodeType) -> bool {
        self.child_types().is_none_or(|children| children.contains(&child))
    }

    /// A fresh element of this type carrying the registry defaults.
    pub fn default_element(self) -> Element {
        let attributes: Attributes = self
            .spec()
            .default_attributes
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
            .collect();
        Element::with_attributes(self, attributes)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        NodeType::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown node type `{name}`")))
    }
}
