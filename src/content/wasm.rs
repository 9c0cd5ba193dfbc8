// JS-facing content client. Every read resolves to a JSON string.

use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::ContentConfig;
use crate::content::client::ContentClient;
use crate::content::image::ImageOptions;
use crate::content::model::ImageRef;
use crate::content::transport::JsFetchTransport;
use crate::error::EngineError;
use crate::page;

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_json::to_string(value)
        .map(|json| JsValue::from_str(&json))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
pub struct WasmContentClient {
    inner: Rc<ContentClient<JsFetchTransport>>,
}

#[wasm_bindgen]
impl WasmContentClient {
    /// `fetch` is `(url: string) => Promise<string>` resolving to the response body.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, fetch: Function) -> Result<WasmContentClient, JsValue> {
        let config: ContentConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid content config: {}", e)))?;
        let client = ContentClient::new(&config, JsFetchTransport::new(fetch)).map_err(to_js)?;
        Ok(WasmContentClient {
            inner: Rc::new(client),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    pub fn list_timeline_summaries(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move { to_json(&client.list_timeline_summaries().await) })
    }

    pub fn get_full_record(&self, slug: String) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move {
            let lookup = client.get_full_record(&slug).await.map_err(to_js)?;
            to_json(&lookup)
        })
    }

    pub fn list_all_slugs(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move { to_json(&client.list_all_slugs().await) })
    }

    pub fn get_site_settings(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move { to_json(&client.get_site_settings().await) })
    }

    /// Home timeline, with the fallback set substituted when nothing came back.
    pub fn home_page(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move {
            let home = page::load_home(&*client).await.map_err(to_js)?;
            to_json(&home)
        })
    }

    pub fn detail_page(&self, slug: String) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move {
            let outcome = page::load_detail(&*client, &slug).await.map_err(to_js)?;
            to_json(&outcome)
        })
    }

    pub fn about_page(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move { to_json(&page::load_about(&*client).await) })
    }

    pub fn static_params(&self) -> Promise {
        let client = Rc::clone(&self.inner);
        future_to_promise(async move { to_json(&page::static_params(&*client).await) })
    }

    /// CDN URL for an image document, or `undefined` when unconfigured.
    pub fn image_url(
        &self,
        image_json: &str,
        options_json: &str,
    ) -> Result<Option<String>, JsValue> {
        let image: ImageRef = serde_json::from_str(image_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid image: {}", e)))?;
        let options: ImageOptions = serde_json::from_str(options_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid image options: {}", e)))?;
        self.inner.image_url(&image, options).map_err(to_js)
    }
}
