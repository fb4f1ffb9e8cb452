pub mod error;
pub mod model;
pub mod transaction;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use error::{ConsistencyError, DocumentError, ValidationError};
pub use model::{
    Annotation, AnnotationId, AnnotationSet, AnnotationStore, Attributes, Document, Element, Item,
    MetaList, NodeCategory, NodeType, Range,
};
pub use transaction::factories::fixup_insertion;
pub use transaction::{AnnotationBias, AnnotationMethod, Operation, Patch, Transaction};
