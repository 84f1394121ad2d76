/// Imported JS bridge functions for the chrome.* extension APIs
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    /// Value stored under `key` in `chrome.storage[area]`, or `null`
    #[wasm_bindgen(catch, js_name = getStorage)]
    pub async fn get_storage(area: &str, key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = setStorage)]
    pub async fn set_storage(area: &str, key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = clearStorage)]
    pub async fn clear_storage(area: &str) -> Result<(), JsValue>;

    /// `chrome.runtime.sendMessage`, resolving to the listener's response
    #[wasm_bindgen(catch, js_name = sendMessage)]
    pub async fn send_message(message: JsValue) -> Result<JsValue, JsValue>;

    /// Installs the handler the worker's `chrome.runtime.onMessage` listener
    /// forwards to. It returns `undefined` to ignore a message or a Promise of
    /// the response.
    #[wasm_bindgen(js_name = setMessageHandler)]
    pub fn set_message_handler(handler: &js_sys::Function);

    /// Form-encoded POST via `fetch`, resolving to `{ status, body }`
    #[wasm_bindgen(catch, js_name = postForm)]
    pub async fn post_form(url: &str, authorization: &str, body: &str) -> Result<JsValue, JsValue>;
}
