//! Pipeline layer: JSON schema + validated in-memory model.
//!
//! JSON shape:
//! {
//!   "inputs":  ["image"],                       // global inputs (any slot shape)
//!   "outputs": ["boxes"],                       // global outputs (any slot shape)
//!   "workflow": [
//!     {
//!       "method_type": "Detect",
//!       "unique_name": "det",
//!       "inputs":  ["image"],
//!       "outputs": [{"type": "box", "outputs": ["boxes"]}]
//!     }
//!   ],
//!   "optional": {...},                          // ignored
//!   "max_running_count": 10                     // ignored
//! }
//!
//! Only the required keys are checked here. Label collisions, empty lists and
//! unfed slots are left to the correlator.

pub mod shape;
pub mod slot;

pub use shape::{SlotGroup, SlotShape};
pub use slot::{SlotId, SlotKind};

use crate::error::MalformedInputError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw top-level document. Every field is optional so that missing keys are
/// reported as `MalformedInputError::MissingKey` rather than a serde message.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPipeline {
    #[serde(default)]
    pub inputs: Option<Value>,

    #[serde(default)]
    pub outputs: Option<Value>,

    #[serde(default)]
    pub workflow: Option<Value>,

    #[serde(default)]
    pub optional: Option<Value>,

    #[serde(default)]
    pub max_running_count: Option<Value>,
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub method_type: String,
    pub unique_name: String,
    pub inputs: SlotShape,
    pub outputs: SlotShape,
}

impl Method {
    /// Two-line caption used for the method's cluster.
    pub fn caption(&self) -> String {
        format!(
            "method_type: {}\nunique_name: {}",
            self.method_type, self.unique_name
        )
    }
}

/// Validated pipeline description.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub global_inputs: SlotShape,
    pub global_outputs: SlotShape,
    /// Carried through untouched; the correlator never reads it.
    pub optional: Map<String, Value>,
    pub max_running_count: Option<Value>,
    pub methods: Vec<Method>,
}

impl Pipeline {
    pub fn from_json_str(text: &str) -> Result<Self, MalformedInputError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, MalformedInputError> {
        if !value.is_object() {
            return Err(MalformedInputError::NotAnObject);
        }
        let raw: RawPipeline = serde_json::from_value(value)?;
        raw.validate_and_build()
    }
}

impl RawPipeline {
    /// Check required keys and classify every slot shape.
    pub fn validate_and_build(self) -> Result<Pipeline, MalformedInputError> {
        let inputs = self
            .inputs
            .ok_or(MalformedInputError::MissingKey { key: "inputs" })?;
        let outputs = self
            .outputs
            .ok_or(MalformedInputError::MissingKey { key: "outputs" })?;
        let workflow = self
            .workflow
            .ok_or(MalformedInputError::MissingKey { key: "workflow" })?;

        let global_inputs = SlotShape::from_value(&inputs, "inputs", "global inputs")?;
        let global_outputs = SlotShape::from_value(&outputs, "outputs", "global outputs")?;

        let entries = workflow
            .as_array()
            .ok_or_else(|| MalformedInputError::NotAnArray {
                location: "workflow".to_string(),
            })?;

        let mut methods = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            methods.push(parse_method(index, entry)?);
        }

        Ok(Pipeline {
            global_inputs,
            global_outputs,
            optional: match self.optional {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            },
            max_running_count: self.max_running_count,
            methods,
        })
    }
}

fn parse_method(index: usize, entry: &Value) -> Result<Method, MalformedInputError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| MalformedInputError::UnclassifiableElement {
            location: "workflow".to_string(),
            position: index,
        })?;

    let string_field = |key: &'static str| -> Result<String, MalformedInputError> {
        match obj.get(key) {
            None | Some(Value::Null) => Err(MalformedInputError::MissingMethodKey { index, key }),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(MalformedInputError::InvalidMethodField { index, key }),
        }
    };

    let method_type = string_field("method_type")?;
    let unique_name = string_field("unique_name")?;

    let shape_field = |key: &'static str| -> Result<SlotShape, MalformedInputError> {
        let value = match obj.get(key) {
            None | Some(Value::Null) => {
                return Err(MalformedInputError::MissingMethodKey { index, key });
            }
            Some(v) => v,
        };
        let location = format!("workflow method #{} (`{}`) {}", index, unique_name, key);
        SlotShape::from_value(value, key, &location)
    };

    let inputs = shape_field("inputs")?;
    let outputs = shape_field("outputs")?;

    Ok(Method {
        method_type,
        unique_name,
        inputs,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_minimal_pipeline() {
        let p = Pipeline::from_value(json!({
            "inputs": ["a", "b"],
            "outputs": ["c"],
            "workflow": [
                {"method_type": "M", "unique_name": "m1", "inputs": ["a"], "outputs": ["c"]}
            ]
        }))
        .unwrap();

        assert_eq!(p.global_inputs, SlotShape::Flat(vec!["a".into(), "b".into()]));
        assert_eq!(p.methods.len(), 1);
        assert_eq!(p.methods[0].unique_name, "m1");
        assert_eq!(p.methods[0].caption(), "method_type: M\nunique_name: m1");
        assert!(p.optional.is_empty());
    }

    #[test]
    fn optional_keys_are_carried_but_not_required() {
        let p = Pipeline::from_value(json!({
            "inputs": [],
            "outputs": [],
            "workflow": [],
            "optional": {"threads": 4},
            "max_running_count": 10
        }))
        .unwrap();
        assert_eq!(p.optional.get("threads"), Some(&json!(4)));
        assert_eq!(p.max_running_count, Some(json!(10)));
    }

    #[test]
    fn missing_top_level_keys_are_reported() {
        for key in ["inputs", "outputs", "workflow"] {
            let mut doc = json!({"inputs": [], "outputs": [], "workflow": []});
            doc.as_object_mut().unwrap().remove(key);
            let err = Pipeline::from_value(doc).unwrap_err();
            match err {
                MalformedInputError::MissingKey { key: k } => assert_eq!(k, key),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn missing_method_keys_report_index_and_key() {
        for key in ["method_type", "unique_name", "inputs", "outputs"] {
            let mut method = json!({
                "method_type": "M", "unique_name": "m", "inputs": [], "outputs": []
            });
            method.as_object_mut().unwrap().remove(key);
            let doc = json!({
                "inputs": [], "outputs": [],
                "workflow": [
                    {"method_type": "M", "unique_name": "ok", "inputs": [], "outputs": []},
                    method
                ]
            });
            let err = Pipeline::from_value(doc).unwrap_err();
            match err {
                MalformedInputError::MissingMethodKey { index, key: k } => {
                    assert_eq!(index, 1);
                    assert_eq!(k, key);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn method_shape_errors_name_the_method() {
        let err = Pipeline::from_value(json!({
            "inputs": [], "outputs": [],
            "workflow": [
                {"method_type": "M", "unique_name": "det", "inputs": ["a", {"inputs": []}], "outputs": []}
            ]
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "workflow method #0 (`det`) inputs: element 1 does not match the shape of element 0 \
             (single labels and typed groups cannot be mixed)"
        );
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(matches!(
            Pipeline::from_value(json!([1, 2])),
            Err(MalformedInputError::NotAnObject)
        ));
        assert!(matches!(
            Pipeline::from_json_str("{ not json"),
            Err(MalformedInputError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_string_method_type_is_rejected() {
        let err = Pipeline::from_value(json!({
            "inputs": [], "outputs": [],
            "workflow": [{"method_type": 3, "unique_name": "m", "inputs": [], "outputs": []}]
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::InvalidMethodField {
                index: 0,
                key: "method_type"
            }
        ));
    }
}
