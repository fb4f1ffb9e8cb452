//! Content units of the linear data.
//!
//! The serialized shape is shared with hosts and journals:
//! - a plain character is a one-character string: `"a"`
//! - an annotated character is a pair: `["b", [0, 2]]`
//! - an opening marker is `{"type": "heading", "attributes": {"level": 1}}`
//! - a closing marker is `{"type": "/heading"}`

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::annotations::{AnnotationId, AnnotationSet};
use super::nodes::NodeType;

pub type Attributes = BTreeMap<String, Value>;

/// Metadata elements attached to one offset.
pub type MetaList = Vec<Element>;

/// An element: the payload of an opening marker, or a metadata entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub node_type: NodeType,
    pub attributes: Attributes,
    /// Only inline content elements carry annotations.
    pub annotations: AnnotationSet,
}

impl Element {
    pub fn new(node_type: NodeType) -> Self {
        Self::with_attributes(node_type, Attributes::new())
    }

    pub fn with_attributes(node_type: NodeType, attributes: Attributes) -> Self {
        Self {
            node_type,
            attributes,
            annotations: AnnotationSet::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Char {
        ch: char,
        annotations: AnnotationSet,
    },
    Open(Element),
    Close(NodeType),
}

impl Item {
    pub fn char(ch: char) -> Self {
        Item::Char {
            ch,
            annotations: AnnotationSet::new(),
        }
    }

    pub fn annotated(ch: char, annotations: impl IntoIterator<Item = AnnotationId>) -> Self {
        Item::Char {
            ch,
            annotations: annotations.into_iter().collect(),
        }
    }

    pub fn open(node_type: NodeType) -> Self {
        Item::Open(Element::new(node_type))
    }

    pub fn close(node_type: NodeType) -> Self {
        Item::Close(node_type)
    }

    /// One plain character item per `char` of `text`.
    pub fn text(text: &str) -> Vec<Item> {
        text.chars().map(Item::char).collect()
    }

    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Item::Char { .. } => None,
            Item::Open(element) => Some(element.node_type),
            Item::Close(node_type) => Some(*node_type),
        }
    }

    pub fn is_element(&self) -> bool {
        !matches!(self, Item::Char { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Item::Open(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Item::Close(_))
    }

    /// Characters and the markers of inline content nodes.
    pub fn is_content(&self) -> bool {
        self.node_type().is_none_or(NodeType::is_content)
    }

    /// Annotations of annotatable items: characters and inline node openings.
    pub fn annotations(&self) -> Option<&AnnotationSet> {
        match self {
            Item::Char { annotations, .. } => Some(annotations),
            Item::Open(element) if element.node_type.is_content() => Some(&element.annotations),
            _ => None,
        }
    }

    pub fn annotations_mut(&mut self) -> Option<&mut AnnotationSet> {
        match self {
            Item::Char { annotations, .. } => Some(annotations),
            Item::Open(element) if element.node_type.is_content() => {
                Some(&mut element.annotations)
            }
            _ => None,
        }
    }
}

impl From<Element> for Item {
    fn from(element: Element) -> Self {
        Item::Open(element)
    }
}

#[derive(Deserialize)]
struct RawMarker {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    annotations: AnnotationSet,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItem {
    Plain(char),
    Annotated(char, AnnotationSet),
    Marker(RawMarker),
}

fn parse_type<E: serde::de::Error>(name: &str) -> Result<NodeType, E> {
    NodeType::from_name(name).ok_or_else(|| E::custom(format!("unknown node type `{name}`")))
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.node_type.name())?;
        if !self.attributes.is_empty() {
            map.serialize_entry("attributes", &self.attributes)?;
        }
        if !self.annotations.is_empty() {
            map.serialize_entry("annotations", &self.annotations)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMarker::deserialize(deserializer)?;
        if raw.kind.starts_with('/') {
            return Err(serde::de::Error::custom(format!(
                "expected an opening element, found `{}`",
                raw.kind
            )));
        }
        Ok(Element {
            node_type: parse_type(&raw.kind)?,
            attributes: raw.attributes,
            annotations: raw.annotations,
        })
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Item::Char { ch, annotations } if annotations.is_empty() => {
                serializer.serialize_char(*ch)
            }
            Item::Char { ch, annotations } => (ch, annotations).serialize(serializer),
            Item::Open(element) => element.serialize(serializer),
            Item::Close(node_type) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", &format!("/{}", node_type.name()))?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawItem::deserialize(deserializer)? {
            RawItem::Plain(ch) => Item::char(ch),
            RawItem::Annotated(ch, annotations) => Item::Char { ch, annotations },
            RawItem::Marker(raw) => match raw.kind.strip_prefix('/') {
                Some(name) => Item::Close(parse_type(name)?),
                None => Item::Open(Element {
                    node_type: parse_type(&raw.kind)?,
                    attributes: raw.attributes,
                    annotations: raw.annotations,
                }),
            },
        })
    }
}
