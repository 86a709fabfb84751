#![cfg(target_arch = "wasm32")]

use crate::controller_handle::JsControllerHandle;
use crate::tool_handle::ToolCoordinatorHandle;
use pie_earl_loader::{controller_global_name, ElementLoader, LoaderOptions, PackageReference, WebSysEnvironment};
use pie_earl_player::{ElementLifecycleEvent, HostEvent, ItemPlayerRuntime, WasmMicrotaskQueue};
use pie_earl_tools::ToolCoordinator;
use pie_earl_types::{Controller, Env, ItemConfig, Mode, SessionContainer, SessionEntry, Strategy};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, CustomEventInit, Element, Event, EventTarget};

struct Inner {
    host: Element,
    loader: ElementLoader<WebSysEnvironment>,
    runtime: Option<ItemPlayerRuntime<WasmMicrotaskQueue>>,
    loader_options: LoaderOptions,
    // Kept alive for as long as `host` listens for child lifecycle events;
    // dropping a `Closure` invalidates the JS-side callback.
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

/// The `pie-item-player` custom element. Observed DOM
/// properties map onto the setters below; emitted CustomEvents are
/// `load-complete`, `session-changed`, `model-updated`, `player-error`.
#[wasm_bindgen]
pub struct PieItemPlayerElement {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl PieItemPlayerElement {
    #[wasm_bindgen(constructor)]
    pub fn new(host: Element) -> PieItemPlayerElement {
        console_error_panic_hook::set_once();

        // DOM-level context propagation (spec §4.8): a tool custom element
        // reaches its coordinator via
        // `this.closest('pie-item-player').toolCoordinator`. The host's own
        // property holds the only strong reference; `Inner` has no need of
        // one.
        let tools = Rc::new(RefCell::new(ToolCoordinator::new()));
        let handle = ToolCoordinatorHandle::new(tools);
        let _ = js_sys::Reflect::set(&host, &"toolCoordinator".into(), &JsValue::from(handle));

        let inner = Rc::new(RefCell::new(Inner {
            host,
            loader: ElementLoader::new(WebSysEnvironment::default()),
            runtime: None,
            loader_options: LoaderOptions::new(Strategy::Esm),
            _listeners: Vec::new(),
        }));
        attach_lifecycle_listeners(&inner);
        PieItemPlayerElement { inner }
    }

    /// Host set `.strategy` (`esm` | `iife` | `preloaded`).
    #[wasm_bindgen(js_name = setStrategy)]
    pub fn set_strategy(&self, strategy: &str) -> Result<(), JsValue> {
        let strategy: Strategy = serde_json::from_value(serde_json::Value::String(strategy.to_string()))
            .map_err(to_js_error)?;
        self.inner.borrow_mut().loader_options.strategy = strategy;
        Ok(())
    }

    /// Host set `.loaderOptions` as a JSON object: `{cdnBase?, bundleHost?,
    /// view?, loadControllers?}`.
    #[wasm_bindgen(js_name = setLoaderOptions)]
    pub fn set_loader_options(&self, json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(to_js_error)?;
        let mut inner = self.inner.borrow_mut();
        if let Some(cdn_base) = value.get("cdnBase").and_then(|v| v.as_str()) {
            inner.loader_options.cdn_base = Some(cdn_base.to_string());
        }
        if let Some(bundle_host) = value.get("bundleHost").and_then(|v| v.as_str()) {
            inner.loader_options.bundle_host = Some(bundle_host.to_string());
        }
        if let Some(load_controllers) = value.get("loadControllers").and_then(|v| v.as_bool()) {
            inner.loader_options.load_controllers = load_controllers;
        }
        Ok(())
    }

    /// Host set `.config`/`.session`/`.env` together, which (re)starts the
    /// loader. Re-setting config on a running runtime cancels logical
    /// attachment to the previous load without aborting the in-flight fetch.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config_json: &str, session_json: &str, env_json: &str) -> Result<(), JsValue> {
        let config: ItemConfig = serde_json::from_str(config_json).map_err(to_js_error)?;
        let session: SessionContainer = serde_json::from_str(session_json).map_err(to_js_error)?;
        let env: Env = serde_json::from_str(env_json).map_err(to_js_error)?;
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

        {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.runtime {
                Some(runtime) => runtime.replace_config(config, session),
                None => {
                    inner.runtime = Some(ItemPlayerRuntime::new(config, session, env, WasmMicrotaskQueue));
                }
            }
        }

        self.spawn_load();
        Ok(())
    }

    /// Host set `.mode` (`gather` | `view` | `evaluate` | `author`). Per
    /// spec §4.7 step 5, a mode change re-invokes `controller.model`/
    /// `controller.outcome` for every rendered instance and pushes the
    /// refreshed values back onto the DOM.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: Mode =
            serde_json::from_value(serde_json::Value::String(mode.to_string())).map_err(to_js_error)?;

        let generation = {
            let mut borrowed = self.inner.borrow_mut();
            let Some(runtime) = &mut borrowed.runtime else {
                return Ok(());
            };
            runtime.set_mode(mode);
            runtime.generation()
        };

        let inner = self.inner.clone();
        spawn_local(async move {
            apply_controllers(&inner, generation).await;
            dispatch_pending(&inner).await;
        });
        Ok(())
    }

    fn spawn_load(&self) {
        let inner = self.inner.clone();
        spawn_local(async move {
            let (config, options, generation) = {
                let borrowed = inner.borrow();
                let Some(runtime) = &borrowed.runtime else { return };
                (runtime.config().clone(), borrowed.loader_options.clone(), runtime.generation())
            };

            let result = {
                let loader = &inner.borrow().loader;
                loader.load(&config, &options).await
            };
            let load_ok = result.is_ok();

            {
                let mut borrowed = inner.borrow_mut();
                // The runtime may have moved on to a later generation while
                // this load was in flight; a stale completion is a no-op.
                if borrowed.runtime.as_ref().map(|r| r.generation()).unwrap_or(u64::MAX) != generation {
                    return;
                }
                if let Some(runtime) = &mut borrowed.runtime {
                    match result {
                        Err(err) => {
                            runtime.on_element_event(generation, ElementLifecycleEvent::PlayerError(err));
                        }
                        // view/evaluate require a controller per tag after
                        // load, or it's a player-error.
                        Ok(()) if runtime.env().requires_controller() => {
                            for (tag, reference) in runtime.config().elements.clone() {
                                let Ok(parsed) = PackageReference::parse(&reference) else {
                                    continue;
                                };
                                let global_name = controller_global_name(&parsed.package_name());
                                if lookup_controller_handle(&global_name).is_none() {
                                    runtime.on_element_event(
                                        generation,
                                        ElementLifecycleEvent::PlayerError(
                                            pie_earl_types::PlayerError::ControllerMissing { tag },
                                        ),
                                    );
                                }
                            }
                        }
                        Ok(()) => {}
                    }
                }
            }

            if load_ok {
                render_and_apply_models(inner.clone(), generation).await;
            }
            dispatch_pending(&inner).await;
        });
    }
}

/// Step 2 + 3 of spec §4.7's load sequence: once every tag in `config` is
/// registered, inject `config.markup` into the host and apply each
/// instance's model (through its controller, when one is available).
async fn render_and_apply_models(inner: Rc<RefCell<Inner>>, generation: u64) {
    {
        let borrowed = inner.borrow();
        let Some(runtime) = &borrowed.runtime else { return };
        if runtime.generation() != generation {
            return;
        }
        borrowed.host.set_inner_html(&runtime.config().markup);
    }
    apply_controllers(&inner, generation).await;
}

/// Shared by the initial load and by mode changes: for each model, locate
/// its rendered `[data-id]` instance and set `.model` to the controller's
/// transform of the raw model (or the raw model itself, absent a
/// controller). In `evaluate` mode also computes `.outcome`.
async fn apply_controllers(inner: &Rc<RefCell<Inner>>, generation: u64) {
    let Some((models, elements, env, host)) = (|| {
        let borrowed = inner.borrow();
        let runtime = borrowed.runtime.as_ref()?;
        if runtime.generation() != generation {
            return None;
        }
        Some((
            runtime.config().models.clone(),
            runtime.config().elements.clone(),
            runtime.env(),
            borrowed.host.clone(),
        ))
    })() else {
        return;
    };

    for model in &models {
        // Torn down mid-loop (config replaced while awaiting a controller
        // call): stop touching instances that no longer belong to us.
        if inner.borrow().runtime.as_ref().map(|r| r.generation()) != Some(generation) {
            return;
        }

        let Some(reference) = elements.get(&model.element) else { continue };
        let controller = PackageReference::parse(reference)
            .ok()
            .and_then(|parsed| lookup_controller_handle(&controller_global_name(&parsed.package_name())));

        let selector = format!("[data-id=\"{}\"]", model.id);
        let Ok(Some(instance)) = host.query_selector(&selector) else { continue };

        let raw_model = serde_json::Value::Object(model.data.clone());
        let session_entry = session_entry_for(inner, &model.id);

        let display_model = match &controller {
            Some(handle) => handle.model(&raw_model, &session_entry, &env).await,
            None => raw_model.clone(),
        };
        set_js_property(&instance, "model", &display_model);

        if env.mode == Mode::Evaluate {
            if let Some(handle) = &controller {
                let outcome = handle.outcome(&raw_model, &session_entry, &env).await;
                set_js_property(&instance, "outcome", &outcome);
            }
        }
    }
}

fn session_entry_for(inner: &Rc<RefCell<Inner>>, model_id: &str) -> SessionEntry {
    inner
        .borrow()
        .runtime
        .as_ref()
        .and_then(|runtime| runtime.session().find(model_id).cloned())
        .unwrap_or_else(|| SessionEntry {
            id: model_id.to_string(),
            complete: false,
            value: None,
            payload: serde_json::Map::new(),
        })
}

fn set_js_property(target: &Element, name: &str, value: &serde_json::Value) {
    if let Ok(js_value) = js_sys::JSON::parse(&value.to_string()) {
        let _ = js_sys::Reflect::set(target, &name.into(), &js_value);
    }
}

/// Attach delegated listeners on `host` for the three events a rendered
/// element instance fires (spec §4.7 step 4): `model.updated`,
/// `session-changed`, `player-error`. Each forwards into
/// `ItemPlayerRuntime::on_element_event` at the instance's current
/// generation.
fn attach_lifecycle_listeners(inner: &Rc<RefCell<Inner>>) {
    let host = inner.borrow().host.clone();
    let target: &EventTarget = host.unchecked_ref();

    let mut closures = Vec::new();
    for event_name in ["model.updated", "session-changed", "player-error"] {
        let inner_for_closure = inner.clone();
        let owned_name = event_name.to_string();
        let closure = Closure::wrap(Box::new(move |event: Event| {
            handle_child_lifecycle_event(inner_for_closure.clone(), &owned_name, event);
        }) as Box<dyn FnMut(Event)>);
        let _ = target.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
        closures.push(closure);
    }
    inner.borrow_mut()._listeners.extend(closures);
}

fn handle_child_lifecycle_event(inner: Rc<RefCell<Inner>>, event_name: &str, event: Event) {
    let Some(target) = event.target() else { return };
    let Ok(element) = target.dyn_into::<Element>() else { return };
    let Some(element_id) = element.get_attribute("data-id") else { return };

    let detail = event
        .dyn_ref::<CustomEvent>()
        .map(|custom_event| custom_event.detail())
        .unwrap_or(JsValue::NULL);
    let detail_json = js_sys::JSON::stringify(&detail)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "null".to_string());
    let detail_value: serde_json::Value = serde_json::from_str(&detail_json).unwrap_or(serde_json::Value::Null);

    let lifecycle_event = match event_name {
        "model.updated" => ElementLifecycleEvent::ModelUpdated {
            element_id: element_id.clone(),
            update: detail_value.get("update").cloned().unwrap_or(serde_json::Value::Null),
            reset: detail_value.get("reset").and_then(|v| v.as_bool()).unwrap_or(false),
        },
        "session-changed" => match serde_json::from_value::<SessionEntry>(detail_value) {
            Ok(entry) => ElementLifecycleEvent::SessionChanged { element_id: element_id.clone(), entry },
            Err(_) => return,
        },
        // Element-reported failures are tag-scoped and recoverable, the
        // same shape as a load failure for that tag.
        "player-error" => {
            let message = detail_value.as_str().map(str::to_string).unwrap_or_else(|| detail_value.to_string());
            let tag = {
                let borrowed = inner.borrow();
                borrowed
                    .runtime
                    .as_ref()
                    .and_then(|runtime| {
                        runtime.config().models.iter().find(|model| model.id == element_id).map(|model| model.element.clone())
                    })
                    .unwrap_or_else(|| element_id.clone())
            };
            ElementLifecycleEvent::PlayerError(pie_earl_types::PlayerError::LoadFailure { tag, message })
        }
        _ => return,
    };

    let delivered = {
        let mut borrowed = inner.borrow_mut();
        borrowed.runtime.as_mut().map(|runtime| {
            let generation = runtime.generation();
            runtime.on_element_event(generation, lifecycle_event);
        })
    };
    if delivered.is_none() {
        return;
    }

    spawn_local(async move {
        dispatch_pending(&inner).await;
    });
}

async fn dispatch_pending(inner: &Rc<RefCell<Inner>>) {
    let events = {
        let mut borrowed = inner.borrow_mut();
        let Some(runtime) = &mut borrowed.runtime else { return };
        runtime.drain_tick().await
    };
    let borrowed = inner.borrow();
    for event in events {
        dispatch_host_event(&borrowed.host, event);
    }
}

fn dispatch_host_event(host: &Element, event: HostEvent) {
    let (name, detail) = match event {
        HostEvent::LoadComplete => ("load-complete".to_string(), serde_json::Value::Null),
        HostEvent::SessionChanged(session) => (
            "session-changed".to_string(),
            serde_json::to_value(session).unwrap_or(serde_json::Value::Null),
        ),
        HostEvent::ModelUpdated { update, reset } => (
            "model-updated".to_string(),
            serde_json::json!({ "update": update, "reset": reset }),
        ),
        HostEvent::PlayerError(err) => (
            "player-error".to_string(),
            serde_json::to_value(err).unwrap_or(serde_json::Value::Null),
        ),
    };

    let Ok(detail_js) = js_sys::JSON::parse(&detail.to_string()) else {
        return;
    };
    let mut init = CustomEventInit::new();
    init.detail(&detail_js);
    if let Ok(custom_event) = CustomEvent::new_with_event_init_dict(&name, &init) {
        let target: &EventTarget = host.unchecked_ref();
        let _ = target.dispatch_event(&custom_event);
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Resolve a controller global name to a [`JsControllerHandle`] the player
/// runtime can invoke
/// `model`/`outcome`/`createDefaultModel` through.
fn lookup_controller_handle(global_name: &str) -> Option<JsControllerHandle> {
    let window = web_sys::window()?;
    let mut current: JsValue = window.into();
    for segment in global_name.split('.') {
        let obj = current.dyn_into::<js_sys::Object>().ok()?;
        current = js_sys::Reflect::get(&obj, &segment.into()).ok()?;
        if current.is_undefined() {
            return None;
        }
    }
    Some(JsControllerHandle::new(current))
}
