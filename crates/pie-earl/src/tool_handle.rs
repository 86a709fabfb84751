#![cfg(target_arch = "wasm32")]

use pie_earl_tools::ToolCoordinator;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::Element;

/// wasm-bindgen-facing wrapper around `ToolCoordinator<Element>`. Set as the
/// `.toolCoordinator` property on the `pie-item-player` host element at
/// construction time; this is the DOM-level context-propagation contract of
/// spec §4.8 — a tool custom element reaches its coordinator via
/// `this.closest('pie-item-player').toolCoordinator`, not by any injection
/// mechanism of its own.
#[wasm_bindgen]
pub struct ToolCoordinatorHandle {
    inner: Rc<RefCell<ToolCoordinator<Element>>>,
}

impl ToolCoordinatorHandle {
    pub(crate) fn new(inner: Rc<RefCell<ToolCoordinator<Element>>>) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen]
impl ToolCoordinatorHandle {
    #[wasm_bindgen(js_name = registerTool)]
    pub fn register_tool(&self, id: String, name: String, element: Option<Element>, layer: String) {
        self.inner.borrow_mut().register_tool(id, name, element, layer);
    }

    #[wasm_bindgen(js_name = unregisterTool)]
    pub fn unregister_tool(&self, id: String) {
        self.inner.borrow_mut().unregister_tool(&id);
    }

    #[wasm_bindgen(js_name = updateToolElement)]
    pub fn update_tool_element(&self, id: String, element: Option<Element>) {
        self.inner.borrow_mut().update_tool_element(&id, element);
    }

    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&self, element: Element) {
        self.inner.borrow_mut().bring_to_front(&element);
    }

    #[wasm_bindgen(js_name = isToolVisible)]
    pub fn is_tool_visible(&self, id: String) -> bool {
        self.inner.borrow().is_tool_visible(&id)
    }

    #[wasm_bindgen(js_name = showTool)]
    pub fn show_tool(&self, id: String) {
        self.inner.borrow_mut().show_tool(&id);
    }

    #[wasm_bindgen(js_name = hideTool)]
    pub fn hide_tool(&self, id: String) {
        self.inner.borrow_mut().hide_tool(&id);
    }

    #[wasm_bindgen(js_name = toggleTool)]
    pub fn toggle_tool(&self, id: String) {
        self.inner.borrow_mut().toggle_tool(&id);
    }
}
