/// Email Founder - Chrome Extension for Work at a Startup
/// Built with Rust + WASM + Yew

mod bridge;
mod chrome;
mod compose;
mod config;
pub mod content;
mod domain;
mod error;
mod lookup;
mod provider;
mod resolver;
mod settings;
mod storage;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Install the FIND_EMAIL / CLEAR_CACHE handler in the background worker
#[wasm_bindgen]
pub fn start_background() {
    bridge::listen();
}

// Inject founder buttons; the caller keeps the handle to detach later
#[wasm_bindgen]
pub fn start_content_script() -> Result<content::FounderButtons, JsValue> {
    let buttons = content::FounderButtons::new()?;
    buttons.attach()?;
    Ok(buttons)
}

// Start the Yew app for the settings popup
#[wasm_bindgen]
pub fn start_settings() {
    yew::Renderer::<ui::settings::SettingsPage>::new().render();
}
