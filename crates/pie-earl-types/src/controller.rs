use crate::env::Env;
use crate::session::SessionEntry;
use async_trait::async_trait;
use serde_json::Value;

/// The polymorphic object every loaded element package may expose. On wasm
/// this wraps a `JsValue` pulled off the module's exports or the global
/// controller registry; native test doubles implement it directly. Futures
/// are `?Send` because the wasm implementation holds a non-`Send` `JsValue`.
#[async_trait(?Send)]
pub trait Controller {
    async fn model(&self, raw_model: &Value, session: &SessionEntry, env: &Env) -> Value;
    async fn outcome(&self, raw_model: &Value, session: &SessionEntry, env: &Env) -> Value;
    async fn create_default_model(&self, raw_model: &Value, env: &Env) -> Value;
}
