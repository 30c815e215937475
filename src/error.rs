//! Structural errors raised while building the pipeline model.
//!
//! Anything listed here aborts the run before correlation starts. Unfed
//! inputs, duplicate outputs and global aliases are not errors: they are
//! reported as graph annotations by the correlator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("pipeline description is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("pipeline description must be a JSON object")]
    NotAnObject,

    #[error("pipeline description is missing required key `{key}`")]
    MissingKey { key: &'static str },

    #[error("workflow method #{index} is missing required key `{key}`")]
    MissingMethodKey { index: usize, key: &'static str },

    #[error("workflow method #{index}: `{key}` must be a string")]
    InvalidMethodField { index: usize, key: &'static str },

    #[error("{location}: expected an array of labels or typed groups")]
    NotAnArray { location: String },

    #[error("{location}: element {position} is neither a label nor a typed group")]
    UnclassifiableElement { location: String, position: usize },

    #[error(
        "{location}: element {position} does not match the shape of element 0 \
         (single labels and typed groups cannot be mixed)"
    )]
    MixedShape { location: String, position: usize },

    #[error("{location}: group {group} has no `{key}` label array")]
    MissingGroupLabels {
        location: String,
        group: usize,
        key: &'static str,
    },

    #[error("{location}: group {group}, label {position} is not a string")]
    NonStringLabel {
        location: String,
        group: usize,
        position: usize,
    },
}
