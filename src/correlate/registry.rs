//! Append-only label registry.
//!
//! Keeps slots in insertion order plus a label -> positions index, so a lookup
//! returns every registered slot with that label (oldest first) without a
//! linear scan.

use crate::pipeline::SlotId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RegisteredSlot {
    pub id: SlotId,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct SlotRegistry {
    entries: Vec<RegisteredSlot>,
    by_label: HashMap<String, Vec<usize>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: SlotId, label: &str) {
        let pos = self.entries.len();
        self.entries.push(RegisteredSlot {
            id,
            label: label.to_string(),
        });
        self.by_label.entry(label.to_string()).or_default().push(pos);
    }

    /// Every slot registered under `label`, in insertion order.
    pub fn matches<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a RegisteredSlot> {
        self.by_label
            .get(label)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
