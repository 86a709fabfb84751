//! Tool Coordinator: the registry the loader exposes to
//! third-party tool modules (ruler, protractor, calculator, TTS, ...).
//! Specified only at its public edges; internal ordering is LRU by a
//! monotone z-index counter.

use std::collections::BTreeMap;

/// Visibility-change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVisibilityEvent {
    pub id: String,
    pub visible: bool,
}

/// One registered tool. `E` is an opaque handle to the tool's DOM element
/// (a `web_sys::Element` in the browser, an arbitrary comparable handle in
/// tests), kept generic so this crate stays usable off the wasm32 target.
#[derive(Debug, Clone)]
pub struct ToolRecord<E> {
    pub id: String,
    pub name: String,
    pub element: Option<E>,
    pub layer: String,
    pub visible: bool,
    pub z_index: u64,
}

/// Registry of floating tools: register/unregister/update, z-order,
/// show/hide/toggle, and a subscription channel for visibility changes.
pub struct ToolCoordinator<E> {
    tools: BTreeMap<String, ToolRecord<E>>,
    z_counter: u64,
    subscribers: Vec<flume::Sender<ToolVisibilityEvent>>,
}

impl<E: Clone + PartialEq> Default for ToolCoordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + PartialEq> ToolCoordinator<E> {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            z_counter: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn register_tool(&mut self, id: impl Into<String>, name: impl Into<String>, element: Option<E>, layer: impl Into<String>) {
        self.z_counter += 1;
        let id = id.into();
        self.tools.insert(
            id.clone(),
            ToolRecord {
                id,
                name: name.into(),
                element,
                layer: layer.into(),
                visible: false,
                z_index: self.z_counter,
            },
        );
    }

    pub fn unregister_tool(&mut self, id: &str) {
        self.tools.remove(id);
    }

    pub fn update_tool_element(&mut self, id: &str, element: Option<E>) {
        if let Some(tool) = self.tools.get_mut(id) {
            tool.element = element;
        }
    }

    /// Bump the z-index of whichever tool owns `element` to the current
    /// top of the monotone counter.
    pub fn bring_to_front(&mut self, element: &E) {
        self.z_counter += 1;
        let next_z = self.z_counter;
        if let Some(tool) = self
            .tools
            .values_mut()
            .find(|tool| tool.element.as_ref() == Some(element))
        {
            tool.z_index = next_z;
        }
    }

    pub fn is_tool_visible(&self, id: &str) -> bool {
        self.tools.get(id).map(|tool| tool.visible).unwrap_or(false)
    }

    pub fn show_tool(&mut self, id: &str) {
        self.set_visible(id, true);
    }

    pub fn hide_tool(&mut self, id: &str) {
        self.set_visible(id, false);
    }

    pub fn toggle_tool(&mut self, id: &str) {
        let next = !self.is_tool_visible(id);
        self.set_visible(id, next);
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        let changed = match self.tools.get_mut(id) {
            Some(tool) if tool.visible != visible => {
                tool.visible = visible;
                true
            }
            _ => false,
        };
        if changed {
            self.notify(ToolVisibilityEvent {
                id: id.to_string(),
                visible,
            });
        }
    }

    /// A new receiver for visibility-change notifications. Multiple
    /// subscribers may coexist; each gets its own copy of every event.
    pub fn subscribe(&mut self) -> flume::Receiver<ToolVisibilityEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: ToolVisibilityEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Tools ordered lowest-to-highest by z-index, the LRU-by-monotone-
    /// counter ordering.
    pub fn ordered_by_z(&self) -> Vec<&ToolRecord<E>> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by_key(|tool| tool.z_index);
        tools
    }
}
