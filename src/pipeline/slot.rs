//! Slot identity.
//!
//! A slot id is synthesized from the owning method index, the slot kind, the
//! group index and the position inside the group:
//!
//! global input, group 1, position 0   =>  `global_input_g1_s0`
//! method 2 output, group 0, position 3 =>  `method2_output_g0_s3`
//!
//! Only uniqueness within one run is guaranteed; the rendered form doubles as
//! the node id handed to the graph sink.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    GlobalInput,
    GlobalOutput,
    MethodInput,
    MethodOutput,
}

impl SlotKind {
    fn as_str(self) -> &'static str {
        match self {
            SlotKind::GlobalInput | SlotKind::MethodInput => "input",
            SlotKind::GlobalOutput | SlotKind::MethodOutput => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotId {
    pub kind: SlotKind,
    /// Index into the workflow array; `None` for global slots.
    pub method: Option<usize>,
    pub group: usize,
    pub position: usize,
}

impl SlotId {
    pub fn global(kind: SlotKind, group: usize, position: usize) -> Self {
        debug_assert!(matches!(kind, SlotKind::GlobalInput | SlotKind::GlobalOutput));
        Self {
            kind,
            method: None,
            group,
            position,
        }
    }

    pub fn method(index: usize, kind: SlotKind, group: usize, position: usize) -> Self {
        debug_assert!(matches!(kind, SlotKind::MethodInput | SlotKind::MethodOutput));
        Self {
            kind,
            method: Some(index),
            group,
            position,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            None => write!(f, "global_{}", self.kind.as_str())?,
            Some(i) => write!(f, "method{}_{}", i, self.kind.as_str())?,
        }
        write!(f, "_g{}_s{}", self.group, self.position)
    }
}
