//! Vitrina Admin - Material binding panel
//!
//! Upload a model, bind catalog materials to its meshes, save the bindings as
//! presets and publish them as a viewer experience.

pub mod app;
pub mod config;
pub mod file_picker;
pub mod requests;
pub mod toasts;
pub mod ui;
pub mod upload;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run(page_config(), Vec::new());
}

/// Configuration for the browser build, taken from the page URL
#[cfg(target_arch = "wasm32")]
fn page_config() -> config::Config {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return config::Config::default();
    };
    let api_param = location
        .href()
        .ok()
        .and_then(|href| web_sys::Url::new(&href).ok())
        .and_then(|url| url.search_params().get("api"));
    config::Config::default().with_page_api(api_param, location.origin().ok())
}
