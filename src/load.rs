//! Read a pipeline description from disk.

use crate::pipeline::Pipeline;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn load_pipeline(path: &Path) -> anyhow::Result<Pipeline> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read pipeline description {}", path.display()))?;
    let pipeline = Pipeline::from_json_str(&text)
        .with_context(|| format!("malformed pipeline description {}", path.display()))?;

    debug!(
        path = %path.display(),
        global_inputs = pipeline.global_inputs.len(),
        global_outputs = pipeline.global_outputs.len(),
        methods = pipeline.methods.len(),
        "loaded pipeline"
    );
    Ok(pipeline)
}
