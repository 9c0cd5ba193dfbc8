// Transport seam between the content client and whatever performs HTTP.
// In the browser that is a JS function returning a Promise of the body text.

use async_trait::async_trait;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::EngineError;

#[async_trait(?Send)]
pub trait ContentTransport {
    /// GET `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String, EngineError>;
}

/// Calls a JS `(url: string) => Promise<string>` supplied by the page.
#[derive(Clone)]
pub struct JsFetchTransport {
    fetch: Function,
}

impl JsFetchTransport {
    pub fn new(fetch: Function) -> Self {
        JsFetchTransport { fetch }
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

#[async_trait(?Send)]
impl ContentTransport for JsFetchTransport {
    async fn fetch(&self, url: &str) -> Result<String, EngineError> {
        let returned = self
            .fetch
            .call1(&JsValue::NULL, &JsValue::from_str(url))
            .map_err(|e| EngineError::Transport(describe(&e)))?;
        let promise: Promise = returned
            .dyn_into()
            .map_err(|_| {
                EngineError::Transport("fetch callback did not return a Promise".to_string())
            })?;
        let body = JsFuture::from(promise)
            .await
            .map_err(|e| EngineError::Transport(describe(&e)))?;
        body.as_string()
            .ok_or_else(|| {
                EngineError::Transport("fetch resolved to a non-string body".to_string())
            })
    }
}
