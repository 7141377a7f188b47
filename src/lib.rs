/// Storyblok Previewer - Chrome Extension for managing and previewing stories
/// Built with Rust + WASM + Yew

pub mod api;
mod browser;
pub mod config;
pub mod credentials;
pub mod links;
mod overlay;
pub mod preview;
pub mod session;
pub mod story;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Listen for preview requests in the page
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    overlay::install(config::Config::default())
}
