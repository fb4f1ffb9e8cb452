pub mod annotations;
pub mod document;
pub mod invariants;
pub mod item;
pub mod nodes;
pub mod range;
pub mod tree;

pub use annotations::{Annotation, AnnotationId, AnnotationSet, AnnotationStore};
pub use document::Document;
pub use item::{Attributes, Element, Item, MetaList};
pub use nodes::{NodeCategory, NodeSpec, NodeType};
pub use range::Range;
pub use tree::Node;
