#![cfg(target_arch = "wasm32")]

use async_trait::async_trait;
use js_sys::{Function, Reflect};
use pie_earl_types::{Controller, Env, SessionEntry};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Wraps a controller object exported by a loaded package and exposes it
/// through the host-side [`Controller`] trait.
/// Each of the three capabilities is looked up as a method on the wrapped
/// `JsValue` and invoked with JSON-serialized arguments; the awaited return
/// value is deserialized back into [`Value`].
pub struct JsControllerHandle {
    js_controller: JsValue,
}

impl JsControllerHandle {
    pub fn new(js_controller: JsValue) -> Self {
        Self { js_controller }
    }

    async fn call_async(&self, method: &str, args: &[Value]) -> Result<Value, JsValue> {
        let func = Reflect::get(&self.js_controller, &method.into())?.dyn_into::<Function>()?;
        let js_args: Vec<JsValue> = args
            .iter()
            .map(|arg| js_sys::JSON::parse(&arg.to_string()).unwrap_or(JsValue::NULL))
            .collect();
        let result = match js_args.len() {
            0 => func.call0(&self.js_controller),
            1 => func.call1(&self.js_controller, &js_args[0]),
            2 => func.call2(&self.js_controller, &js_args[0], &js_args[1]),
            _ => func.call3(&self.js_controller, &js_args[0], &js_args[1], &js_args[2]),
        }?;

        let resolved = if result.has_type::<js_sys::Promise>() {
            JsFuture::from(result.unchecked_into::<js_sys::Promise>()).await?
        } else {
            result
        };

        let json = js_sys::JSON::stringify(&resolved)?
            .as_string()
            .unwrap_or_else(|| "null".to_string());
        Ok(serde_json::from_str(&json).unwrap_or(Value::Null))
    }
}

#[async_trait(?Send)]
impl Controller for JsControllerHandle {
    async fn model(&self, raw_model: &Value, session: &SessionEntry, env: &Env) -> Value {
        let session_value = serde_json::to_value(session).unwrap_or(Value::Null);
        let env_value = serde_json::to_value(env).unwrap_or(Value::Null);
        self.call_async("model", &[raw_model.clone(), session_value, env_value])
            .await
            .unwrap_or(Value::Null)
    }

    async fn outcome(&self, raw_model: &Value, session: &SessionEntry, env: &Env) -> Value {
        let session_value = serde_json::to_value(session).unwrap_or(Value::Null);
        let env_value = serde_json::to_value(env).unwrap_or(Value::Null);
        self.call_async("outcome", &[raw_model.clone(), session_value, env_value])
            .await
            .unwrap_or(Value::Null)
    }

    async fn create_default_model(&self, raw_model: &Value, env: &Env) -> Value {
        let env_value = serde_json::to_value(env).unwrap_or(Value::Null);
        self.call_async("createDefaultModel", &[raw_model.clone(), env_value])
            .await
            .unwrap_or(Value::Null)
    }
}
