use crate::model::NodeType;

/// Malformed arguments to a transaction factory or builder.
///
/// Raised while a transaction is being constructed, never while applying it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Offset {offset} is outside the document (length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("Range {start}..{end} is outside the document (length {len})")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("Cannot remove {requested} items at offset {offset}: only {available} remain")]
    InsufficientContent {
        offset: usize,
        requested: usize,
        available: usize,
    },
    #[error("Offset {0} is not on an opening element")]
    NotAnOpeningElement(usize),
    #[error("Inserted data closes the document root")]
    ClosingRoot,
    #[error("Inserted data closes {found} while {expected} is open")]
    MismatchedClose { expected: String, found: NodeType },
    #[error("{0} cannot be placed under any parent")]
    NoLegalParent(NodeType),
    #[error("{0} is not a content branch type")]
    NotAContentBranch(NodeType),
    #[error("Expected {expected} at offset {offset}, found {found}")]
    UnwrapMismatch {
        offset: usize,
        expected: NodeType,
        found: String,
    },
    #[error("Unexpected content at offset {0} outside the wrapped elements")]
    UnexpectedContent(usize),
    #[error("Outer wrapper would straddle content outside the range at offset {0}")]
    StraddlingUnwrap(usize),
    #[error("Metadata index {index} is out of bounds at offset {offset} (length {len})")]
    MetadataIndexOutOfBounds {
        offset: usize,
        index: usize,
        len: usize,
    },
    #[error("Metadata range {start}..{end} is out of bounds at offset {offset} (length {len})")]
    MetadataRangeOutOfBounds {
        offset: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// A transaction that no longer matches the document it is applied to.
///
/// Applying is all-or-nothing: when one of these is returned the document has
/// not been touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("Removed content does not match the document at offset {0}")]
    RemoveMismatch(usize),
    #[error("Removed metadata does not match the document at offset {0}")]
    MetadataMismatch(usize),
    #[error("Metadata operation out of bounds at offset {0}")]
    MetadataOutOfBounds(usize),
    #[error("Replacement at offset {offset} yields {found} metadata lists, expected {expected}")]
    MetadataShape {
        offset: usize,
        expected: usize,
        found: usize,
    },
    #[error("Operation runs past the end of the document at offset {0}")]
    PastEnd(usize),
    #[error("Transaction covers {covered} items but the document has {len}")]
    LengthMismatch { covered: usize, len: usize },
    #[error("Attribute target at offset {0} is not an opening element")]
    AttributeTarget(usize),
    #[error("Attribute `{key}` at offset {offset} does not have the expected value")]
    AttributeMismatch { offset: usize, key: String },
    #[error("Annotation is already set at offset {0}")]
    AlreadyAnnotated(usize),
    #[error("Annotation is not set at offset {0}")]
    NotAnnotated(usize),
    #[error("Cannot replace content while annotating at offset {0}")]
    ReplaceWhileAnnotating(usize),
    #[error("Annotation stopped at offset {0} was never started")]
    UnmatchedAnnotationStop(usize),
    #[error("Annotation started but never stopped")]
    UnclosedAnnotation,
}

/// Problems loading or checking a whole document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unbalanced structure at offset {offset}: {reason}")]
    Unbalanced { offset: usize, reason: String },
    #[error("{child} is not allowed inside {parent} at offset {offset}")]
    IllegalNesting {
        offset: usize,
        parent: NodeType,
        child: String,
    },
    #[error("Expected {expected} metadata lists, found {found}")]
    MetadataLength { expected: usize, found: usize },
    #[error("{0} cannot be stored as metadata")]
    NotMetadata(NodeType),
    #[error("Unknown annotation index {index} at offset {offset}")]
    UnknownAnnotation { offset: usize, index: usize },
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}
