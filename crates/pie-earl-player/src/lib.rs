//! Item Player Runtime: binds a config+session+env triple to
//! a registered tag, applies lifecycle events back onto the session, and
//! debounces `session-changed` to one emitted snapshot per tick.

mod events;
mod microtask;
mod runtime;

pub use events::{ElementLifecycleEvent, HostEvent};
pub use microtask::{MicrotaskQueue, TokioMicrotaskQueue};
pub use runtime::ItemPlayerRuntime;

#[cfg(target_arch = "wasm32")]
pub use microtask::WasmMicrotaskQueue;
