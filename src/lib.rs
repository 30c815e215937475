//! Pipeline description -> data-flow graph.
//!
//! `pipeline` parses and validates the JSON description, `correlate` matches
//! consumers to producers by label and flags naming collisions, `graph` holds
//! the abstract result and `render` turns it into DOT, JSON or an image.

pub mod correlate;
pub mod error;
pub mod graph;
pub mod load;
pub mod pipeline;
pub mod render;

pub type Result<T> = anyhow::Result<T>;

pub use correlate::{CorrelationReport, analyze, correlate};
pub use error::MalformedInputError;
pub use graph::{FlowGraph, GraphSink};
pub use pipeline::Pipeline;
