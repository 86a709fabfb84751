use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One element instance's session state. `id` matches a model's `id`;
/// `payload` is free-form data the element owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Host-owned session state for one item. Ordering in `data` carries no
/// semantic meaning; lookup is always by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContainer {
    pub id: String,
    pub data: Vec<SessionEntry>,
}

impl SessionContainer {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Vec::new(),
        }
    }

    pub fn find(&self, entry_id: &str) -> Option<&SessionEntry> {
        self.data.iter().find(|e| e.id == entry_id)
    }

    /// Merge one element's session-changed payload in by `id`, replacing
    /// any existing entry for that id (last-writer-wins).
    pub fn merge(&mut self, entry: SessionEntry) {
        match self.data.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.data.push(entry),
        }
    }
}
