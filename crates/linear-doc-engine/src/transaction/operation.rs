use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{Annotation, Element, Item, MetaList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMethod {
    Set,
    Clear,
}

impl AnnotationMethod {
    pub fn opposite(self) -> Self {
        match self {
            AnnotationMethod::Set => AnnotationMethod::Clear,
            AnnotationMethod::Clear => AnnotationMethod::Set,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationBias {
    Start,
    Stop,
}

/// One step of a transaction. Serialized as a record tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    Retain {
        length: usize,
    },
    /// `remove` must equal the live data at the cursor. The metadata fields
    /// are either all present or all absent; when absent the metadata lists
    /// of the removed offsets are concatenated at the replacement point.
    Replace {
        remove: Vec<Item>,
        insert: Vec<Item>,
        #[serde(
            rename = "retainMetadata",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        retain_metadata: Option<usize>,
        #[serde(
            rename = "removeMetadata",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        remove_metadata: Option<Vec<MetaList>>,
        #[serde(
            rename = "insertMetadata",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        insert_metadata: Option<Vec<MetaList>>,
    },
    /// `None` means the attribute is absent; `Some(Value::Null)` is an
    /// attribute explicitly set to null.
    Attribute {
        key: String,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_some"
        )]
        from: Option<Value>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "deserialize_some"
        )]
        to: Option<Value>,
    },
    Annotate {
        method: AnnotationMethod,
        bias: AnnotationBias,
        annotation: Annotation,
    },
    RetainMetadata {
        length: usize,
    },
    ReplaceMetadata {
        remove: Vec<Element>,
        insert: Vec<Element>,
    },
}

/// Distinguishes a present `null` from a missing field.
fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Operation {
    pub fn replace(remove: Vec<Item>, insert: Vec<Item>) -> Self {
        Operation::Replace {
            remove,
            insert,
            retain_metadata: None,
            remove_metadata: None,
            insert_metadata: None,
        }
    }

    /// The operation undoing this one.
    pub fn inverted(&self) -> Self {
        match self {
            Operation::Retain { .. } | Operation::RetainMetadata { .. } => self.clone(),
            Operation::Replace {
                remove,
                insert,
                retain_metadata,
                remove_metadata,
                insert_metadata,
            } => Operation::Replace {
                remove: insert.clone(),
                insert: remove.clone(),
                retain_metadata: *retain_metadata,
                remove_metadata: insert_metadata.clone(),
                insert_metadata: remove_metadata.clone(),
            },
            Operation::Attribute { key, from, to } => Operation::Attribute {
                key: key.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Operation::Annotate {
                method,
                bias,
                annotation,
            } => Operation::Annotate {
                method: method.opposite(),
                bias: *bias,
                annotation: annotation.clone(),
            },
            Operation::ReplaceMetadata { remove, insert } => Operation::ReplaceMetadata {
                remove: insert.clone(),
                insert: remove.clone(),
            },
        }
    }
}
