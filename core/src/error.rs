//! Error types for producing and merging definitions.

use std::fmt;

use thiserror::Error;

/// Errors raised by a [`DefinitionProducer`](crate::DefinitionProducer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerError {
    /// A `$ref` member in a definition template is not a string.
    #[error("invalid $ref in definition {definition}: {value}")]
    InvalidReference { definition: String, value: String },
}

/// A reference whose target is not in the merged definition set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DanglingReference {
    /// Definition (or root resource) containing the reference.
    pub from: String,
    /// Raw `$ref` value.
    pub pointer: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (referenced by {})", self.pointer, self.from)
    }
}

/// Errors that abort a merge. No partial document is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The primary producer failed.
    #[error("primary producer failed: {0}")]
    Producer(#[from] ProducerError),

    /// A requested root was not produced by the primary producer.
    #[error("unknown root resource: {0}")]
    UnknownRoot(String),

    /// Two primary definitions normalize to the same public name.
    #[error("definitions {first} and {second} both normalize to {name}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// References left dangling after overlay and augmentation.
    #[error("unresolved references: {}", join_dangling(.0))]
    UnresolvedReferences(Vec<DanglingReference>),
}

fn join_dangling(dangling: &[DanglingReference]) -> String {
    dangling
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias for results with [`MergeError`].
pub type Result<T> = std::result::Result<T, MergeError>;
