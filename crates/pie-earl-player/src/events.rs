use pie_earl_types::{PlayerError, PlayerErrorEvent, SessionContainer, SessionEntry};
use serde_json::Value;

/// Raw lifecycle events an element instance fires.
/// `element_id` ties the event back to the model/element instance it came
/// from.
#[derive(Debug, Clone)]
pub enum ElementLifecycleEvent {
    ModelUpdated {
        element_id: String,
        update: Value,
        reset: bool,
    },
    SessionChanged {
        element_id: String,
        entry: SessionEntry,
    },
    PlayerError(PlayerError),
}

/// Normalized host-visible events the runtime re-emits.
#[derive(Debug, Clone)]
pub enum HostEvent {
    LoadComplete,
    SessionChanged(SessionContainer),
    ModelUpdated { update: Value, reset: bool },
    PlayerError(PlayerErrorEvent),
}
