use orrery_engine::EngineError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Failures while bringing up or driving the browser shell.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no global window")]
    NoWindow,

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("container #{0} has zero size")]
    ZeroSizedContainer(String),

    #[error("WebGL2 is not available in this browser")]
    WebGlUnavailable,

    #[error("shader '{name}' failed: {message}")]
    Shader { name: String, message: String },

    #[error("GPU resource allocation failed: {0}")]
    Gpu(&'static str),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for ShellError {
    fn from(value: JsValue) -> Self {
        // Thrown DOMExceptions and Errors carry a readable message.
        let message = match value.dyn_ref::<js_sys::Error>() {
            Some(err) => String::from(err.message()),
            None => value.as_string().unwrap_or_else(|| format!("{value:?}")),
        };
        ShellError::Js(message)
    }
}

impl From<ShellError> for JsValue {
    fn from(err: ShellError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
