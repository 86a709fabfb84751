use async_trait::async_trait;

/// What a dynamic `import()` or injected `<script>` produced, from the
/// loader's point of view: does the document now define the tag, and did
/// the load surface a controller under a global name.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub controller_name: Option<String>,
}

/// Everything the three strategies need from the hosting document. Behind
/// this trait so the loader is testable off the wasm32 target; the real
/// implementation (`WebSysEnvironment`) is `#[cfg(target_arch = "wasm32")]`.
#[async_trait(?Send)]
pub trait DomEnvironment {
    /// Strategy A: `import(specifier)`. The module is expected to register
    /// the custom element itself as a side effect.
    async fn import_module(&self, specifier: &str) -> Result<LoadOutcome, String>;

    /// Strategy B: inject `<script src=url>` and await its `load` event.
    /// `bundle_key` identifies this host+reference pair so repeat calls are
    /// no-ops once injected (the "global side-effect registry").
    async fn inject_script(&self, url: &str, bundle_key: &str) -> Result<(), String>;

    /// Strategy C, and post-load verification for A/B: is `tag` a defined
    /// custom element in this document right now.
    fn is_tag_defined(&self, tag: &str) -> bool;

    /// Look up a controller previously published under a global name
    /// (legacy discovery mechanism, kept for bundles that never export a
    /// controller object directly).
    fn lookup_global_controller(&self, global_name: &str) -> Option<()>;
}

#[cfg(target_arch = "wasm32")]
pub use wasm::WebSysEnvironment;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use super::{DomEnvironment, LoadOutcome};
    use async_trait::async_trait;
    use dashmap::DashSet;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    /// Browser-backed [`DomEnvironment`] built on `web-sys`/`js-sys`.
    pub struct WebSysEnvironment {
        injected_bundles: DashSet<String>,
    }

    impl Default for WebSysEnvironment {
        fn default() -> Self {
            Self {
                injected_bundles: DashSet::new(),
            }
        }
    }

    #[async_trait(?Send)]
    impl DomEnvironment for WebSysEnvironment {
        async fn import_module(&self, specifier: &str) -> Result<LoadOutcome, String> {
            let promise = js_sys::eval(&format!("import({:?})", specifier))
                .map_err(|e| format!("{e:?}"))?
                .dyn_into::<js_sys::Promise>()
                .map_err(|_| "import() did not return a promise".to_string())?;
            JsFuture::from(promise)
                .await
                .map_err(|e| format!("{e:?}"))?;
            Ok(LoadOutcome::default())
        }

        async fn inject_script(&self, url: &str, bundle_key: &str) -> Result<(), String> {
            if !self.injected_bundles.insert(bundle_key.to_string()) {
                return Ok(());
            }
            let window = web_sys::window().ok_or("no window")?;
            let document = window.document().ok_or("no document")?;
            let script: web_sys::HtmlScriptElement = document
                .create_element("script")
                .map_err(|e| format!("{e:?}"))?
                .dyn_into()
                .map_err(|_| "create_element did not yield a script element".to_string())?;
            script.set_src(url);

            let (tx, rx) = futures_channel::oneshot::channel();
            let tx = std::cell::RefCell::new(Some(tx));
            let onload = wasm_bindgen::closure::Closure::once(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(());
                }
            });
            script.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            document
                .head()
                .ok_or("no document head")?
                .append_child(&script)
                .map_err(|e| format!("{e:?}"))?;

            rx.await.map_err(|_| "script load channel dropped".to_string())
        }

        fn is_tag_defined(&self, tag: &str) -> bool {
            web_sys::window()
                .and_then(|w| Some(w.custom_elements()))
                .map(|registry| !registry.get(tag).is_undefined())
                .unwrap_or(false)
        }

        fn lookup_global_controller(&self, global_name: &str) -> Option<()> {
            let window = web_sys::window()?;
            let mut current: wasm_bindgen::JsValue = window.into();
            for segment in global_name.split('.') {
                let obj = current.dyn_into::<js_sys::Object>().ok()?;
                current = js_sys::Reflect::get(&obj, &segment.into()).ok()?;
                if current.is_undefined() {
                    return None;
                }
            }
            Some(())
        }
    }

}
