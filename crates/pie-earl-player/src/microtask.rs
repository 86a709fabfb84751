use async_trait::async_trait;

/// A single suspension point at the microtask boundary, used to coalesce
/// `session-changed` events fired by multiple elements within one tick
/// into a single emitted snapshot.
#[async_trait(?Send)]
pub trait MicrotaskQueue {
    async fn yield_once(&self);
}

/// Native substitute for tests and non-browser hosts: yields to the tokio
/// scheduler once, which runs after any already-queued synchronous work.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioMicrotaskQueue;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl MicrotaskQueue for TokioMicrotaskQueue {
    async fn yield_once(&self) {
        tokio::task::yield_now().await;
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmMicrotaskQueue;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use super::MicrotaskQueue;
    use async_trait::async_trait;
    use wasm_bindgen_futures::JsFuture;

    /// Resolves an already-settled `Promise`, which schedules the
    /// continuation as a microtask the same way `await`ing a resolved
    /// promise does in JS.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WasmMicrotaskQueue;

    #[async_trait(?Send)]
    impl MicrotaskQueue for WasmMicrotaskQueue {
        async fn yield_once(&self) {
            let promise = js_sys::Promise::resolve(&wasm_bindgen::JsValue::NULL);
            let _ = JsFuture::from(promise).await;
        }
    }
}
