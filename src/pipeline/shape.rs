//! Slot shapes: the two ways a list of slots can be declared.
//!
//! JSON shapes:
//!   single-type: ["image", "boxes"]
//!   multi-type:  [{"type": "img", "inputs": ["image"]}, {"type": "det", "inputs": ["boxes"]}]
//!
//! For output lists the nested key is `outputs` instead of `inputs`. The kind
//! is decided once, from element 0, and every other element must agree.

use crate::error::MalformedInputError;
use serde_json::Value;

/// One typed group of a multi-type shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGroup {
    pub type_name: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotShape {
    Flat(Vec<String>),
    Grouped(Vec<SlotGroup>),
}

impl SlotShape {
    /// Parse a shape array. `labels_key` is the nested key holding a group's
    /// labels (`inputs` or `outputs`); `location` is only used in errors.
    pub fn from_value(
        value: &Value,
        labels_key: &'static str,
        location: &str,
    ) -> Result<Self, MalformedInputError> {
        let items = value
            .as_array()
            .ok_or_else(|| MalformedInputError::NotAnArray {
                location: location.to_string(),
            })?;

        let Some(first) = items.first() else {
            return Ok(SlotShape::Flat(Vec::new()));
        };

        match first {
            Value::String(_) => {
                let mut labels = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => labels.push(s.clone()),
                        Value::Object(_) => {
                            return Err(MalformedInputError::MixedShape {
                                location: location.to_string(),
                                position,
                            });
                        }
                        _ => {
                            return Err(MalformedInputError::UnclassifiableElement {
                                location: location.to_string(),
                                position,
                            });
                        }
                    }
                }
                Ok(SlotShape::Flat(labels))
            }
            Value::Object(_) => {
                let mut groups = Vec::with_capacity(items.len());
                for (group, item) in items.iter().enumerate() {
                    let obj = match item {
                        Value::Object(obj) => obj,
                        Value::String(_) => {
                            return Err(MalformedInputError::MixedShape {
                                location: location.to_string(),
                                position: group,
                            });
                        }
                        _ => {
                            return Err(MalformedInputError::UnclassifiableElement {
                                location: location.to_string(),
                                position: group,
                            });
                        }
                    };

                    let raw_labels = obj.get(labels_key).and_then(Value::as_array).ok_or_else(|| {
                        MalformedInputError::MissingGroupLabels {
                            location: location.to_string(),
                            group,
                            key: labels_key,
                        }
                    })?;

                    let mut labels = Vec::with_capacity(raw_labels.len());
                    for (position, label) in raw_labels.iter().enumerate() {
                        let label = label.as_str().ok_or_else(|| MalformedInputError::NonStringLabel {
                            location: location.to_string(),
                            group,
                            position,
                        })?;
                        labels.push(label.to_string());
                    }

                    let type_name = obj
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();

                    groups.push(SlotGroup { type_name, labels });
                }
                Ok(SlotShape::Grouped(groups))
            }
            _ => Err(MalformedInputError::UnclassifiableElement {
                location: location.to_string(),
                position: 0,
            }),
        }
    }

    /// Flattened `(group, position, label)` triples in declaration order.
    /// Flat shapes report every label as group 0.
    pub fn slots(&self) -> Box<dyn Iterator<Item = (usize, usize, &str)> + '_> {
        match self {
            SlotShape::Flat(labels) => Box::new(
                labels
                    .iter()
                    .enumerate()
                    .map(|(pos, l)| (0, pos, l.as_str())),
            ),
            SlotShape::Grouped(groups) => Box::new(groups.iter().enumerate().flat_map(|(g, group)| {
                group
                    .labels
                    .iter()
                    .enumerate()
                    .map(move |(pos, l)| (g, pos, l.as_str()))
            })),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SlotShape::Flat(labels) => labels.len(),
            SlotShape::Grouped(groups) => groups.iter().map(|g| g.labels.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn flat_shape_keeps_order() {
        let shape = SlotShape::from_value(&json!(["a", "b", "a"]), "inputs", "test").unwrap();
        assert_eq!(
            shape,
            SlotShape::Flat(vec!["a".into(), "b".into(), "a".into()])
        );
        let slots: Vec<_> = shape.slots().collect();
        assert_eq!(slots, vec![(0, 0, "a"), (0, 1, "b"), (0, 2, "a")]);
    }

    #[test]
    fn grouped_shape_flattens_group_by_group() {
        let value = json!([
            {"type": "img", "outputs": ["x", "y"]},
            {"type": "det", "outputs": ["z"]}
        ]);
        let shape = SlotShape::from_value(&value, "outputs", "test").unwrap();
        let slots: Vec<_> = shape.slots().collect();
        assert_eq!(slots, vec![(0, 0, "x"), (0, 1, "y"), (1, 0, "z")]);
        assert_eq!(shape.len(), 3);
        match shape {
            SlotShape::Grouped(groups) => assert_eq!(groups[1].type_name, "det"),
            other => panic!("expected grouped shape, got {other:?}"),
        }
    }

    #[test]
    fn empty_array_is_an_empty_flat_shape() {
        let shape = SlotShape::from_value(&json!([]), "inputs", "test").unwrap();
        assert!(shape.is_empty());
        assert_eq!(shape, SlotShape::Flat(vec![]));
    }

    #[test]
    fn missing_type_defaults_to_empty_name() {
        let shape = SlotShape::from_value(&json!([{"inputs": ["a"]}]), "inputs", "test").unwrap();
        assert_eq!(
            shape,
            SlotShape::Grouped(vec![SlotGroup {
                type_name: String::new(),
                labels: vec!["a".into()],
            }])
        );
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = SlotShape::from_value(&json!(["a", {"inputs": ["b"]}]), "inputs", "global inputs")
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::MixedShape { position: 1, .. }
        ));

        let err = SlotShape::from_value(&json!([{"inputs": ["b"]}, "a"]), "inputs", "global inputs")
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::MixedShape { position: 1, .. }
        ));
    }

    #[test]
    fn unclassifiable_first_element_is_rejected() {
        let err = SlotShape::from_value(&json!([42]), "inputs", "global inputs").unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::UnclassifiableElement { position: 0, .. }
        ));
        assert!(err.to_string().starts_with("global inputs:"));
    }

    #[test]
    fn group_without_label_list_is_rejected() {
        let err = SlotShape::from_value(&json!([{"type": "t", "inputs": ["a"]}]), "outputs", "m")
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::MissingGroupLabels {
                group: 0,
                key: "outputs",
                ..
            }
        ));
    }

    #[test]
    fn non_array_shape_is_rejected() {
        let err = SlotShape::from_value(&json!("a"), "inputs", "global inputs").unwrap_err();
        assert!(matches!(err, MalformedInputError::NotAnArray { .. }));
    }

    #[test]
    fn non_string_label_in_group_is_rejected() {
        let err = SlotShape::from_value(&json!([{"inputs": ["a", 1]}]), "inputs", "m").unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::NonStringLabel {
                group: 0,
                position: 1,
                ..
            }
        ));
    }
}
