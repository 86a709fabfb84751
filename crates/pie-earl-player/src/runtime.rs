use crate::events::{ElementLifecycleEvent, HostEvent};
use crate::microtask::MicrotaskQueue;
use pie_earl_types::{Env, ItemConfig, Mode, SessionContainer};

/// Binds one `{config, session, env}` triple to a registered tag and wires
/// its lifecycle events into host-visible ones.
///
/// Controller re-invocation on load/mode-change is the caller's
/// responsibility: a `Controller` handle lives with whatever loaded the
/// element (`pie-earl-loader`'s registry), not with the runtime, so the
/// runtime only tracks the current `Env` and exposes it via [`Self::env`]
/// for the caller to act on.
pub struct ItemPlayerRuntime<Q: MicrotaskQueue> {
    config: ItemConfig,
    session: SessionContainer,
    env: Env,
    /// Bumped on every `replace_config`; events tagged with a stale
    /// generation are late arrivals from a torn-down instance and dropped
    /// from a torn-down instance.
    generation: u64,
    session_dirty: bool,
    pending: Vec<HostEvent>,
    microtasks: Q,
}

impl<Q: MicrotaskQueue> ItemPlayerRuntime<Q> {
    pub fn new(config: ItemConfig, session: SessionContainer, env: Env, microtasks: Q) -> Self {
        Self {
            config,
            session,
            env,
            generation: 0,
            session_dirty: false,
            pending: vec![HostEvent::LoadComplete],
            microtasks,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &ItemConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContainer {
        &self.session
    }

    pub fn env(&self) -> Env {
        self.env
    }

    /// Host replaced `config` on a running runtime (authoring mode). The
    /// previous generation's in-flight load resolves into a no-op; events
    /// tagged with it are ignored from here on.
    pub fn replace_config(&mut self, config: ItemConfig, session: SessionContainer) {
        self.generation += 1;
        self.config = config;
        self.session = session;
        self.pending.clear();
        self.session_dirty = false;
        self.pending.push(HostEvent::LoadComplete);
    }

    /// Mode change (`gather` <-> `view` <-> `evaluate`).
    /// The caller re-invokes `controller.model`/`controller.outcome` using
    /// the updated `env()` and feeds any resulting `model-updated` back
    /// through `on_element_event`.
    pub fn set_mode(&mut self, mode: Mode) {
        self.env.mode = mode;
    }

    /// Handle one lifecycle event from a rendered element instance.
    /// `event_generation` must match [`Self::generation`] or the event is
    /// silently dropped.
    pub fn on_element_event(&mut self, event_generation: u64, event: ElementLifecycleEvent) {
        if event_generation != self.generation {
            return;
        }
        match event {
            ElementLifecycleEvent::ModelUpdated { update, reset, .. } => {
                self.pending.push(HostEvent::ModelUpdated { update, reset });
            }
            ElementLifecycleEvent::SessionChanged { entry, .. } => {
                self.session.merge(entry);
                self.session_dirty = true;
            }
            ElementLifecycleEvent::PlayerError(err) => {
                self.pending.push(HostEvent::PlayerError(err.to_event()));
            }
        }
    }

    /// Await one microtask boundary, then drain this tick's host events:
    /// every non-session event queued since the last drain, plus at most
    /// one coalesced `SessionChanged` snapshot: exactly one emitted session
    /// snapshot per tick.
    pub async fn drain_tick(&mut self) -> Vec<HostEvent> {
        self.microtasks.yield_once().await;
        let mut out = std::mem::take(&mut self.pending);
        if self.session_dirty {
            out.push(HostEvent::SessionChanged(self.session.clone()));
            self.session_dirty = false;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microtask::TokioMicrotaskQueue;
    use pie_earl_types::{ModelEntry, Role, SessionEntry};
    use serde_json::json;

    fn config() -> ItemConfig {
        ItemConfig {
            markup: "<hotspot-element data-id=\"m1\"></hotspot-element>".to_string(),
            elements: [("hotspot-element".to_string(), "@pie-element/hotspot@1.0.0".to_string())]
                .into_iter()
                .collect(),
            models: vec![ModelEntry {
                id: "m1".to_string(),
                element: "hotspot-element".to_string(),
                data: serde_json::Map::new(),
            }],
            id: None,
        }
    }

    fn runtime() -> ItemPlayerRuntime<TokioMicrotaskQueue> {
        ItemPlayerRuntime::new(
            config(),
            SessionContainer::empty("sess-1"),
            Env::new(Mode::Gather, Role::Student),
            TokioMicrotaskQueue,
        )
    }

    #[tokio::test]
    async fn load_complete_is_emitted_on_first_drain() {
        let mut rt = runtime();
        let events = rt.drain_tick().await;
        assert!(matches!(events[0], HostEvent::LoadComplete));
    }

    #[tokio::test]
    async fn multiple_session_changes_within_a_tick_coalesce_into_one_snapshot() {
        let mut rt = runtime();
        rt.drain_tick().await;

        rt.on_element_event(
            0,
            ElementLifecycleEvent::SessionChanged {
                element_id: "m1".to_string(),
                entry: SessionEntry {
                    id: "m1".to_string(),
                    complete: false,
                    value: Some(json!("a")),
                    payload: serde_json::Map::new(),
                },
            },
        );
        rt.on_element_event(
            0,
            ElementLifecycleEvent::SessionChanged {
                element_id: "m1".to_string(),
                entry: SessionEntry {
                    id: "m1".to_string(),
                    complete: true,
                    value: Some(json!("b")),
                    payload: serde_json::Map::new(),
                },
            },
        );

        let events = rt.drain_tick().await;
        let session_events: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, HostEvent::SessionChanged(_)))
            .collect();
        assert_eq!(session_events.len(), 1);
        if let HostEvent::SessionChanged(container) = &session_events[0] {
            assert_eq!(container.find("m1").unwrap().value, Some(json!("b")));
        }
    }

    #[tokio::test]
    async fn events_from_a_superseded_generation_are_dropped() {
        let mut rt = runtime();
        rt.drain_tick().await;
        let stale_generation = rt.generation();

        rt.replace_config(config(), SessionContainer::empty("sess-2"));
        rt.on_element_event(
            stale_generation,
            ElementLifecycleEvent::PlayerError(pie_earl_types::PlayerError::ControllerMissing {
                tag: "hotspot-element".to_string(),
            }),
        );

        let events = rt.drain_tick().await;
        assert!(events.iter().all(|e| !matches!(e, HostEvent::PlayerError(_))));
    }
}
