//! WASM bindings for oculus.
//!
//! Exposes the `Oculus` class to JavaScript/TypeScript pages: construct it
//! with optional config, register page-specific handlers, then call `init()`.

mod handler;
mod oculus;
mod types;

pub use handler::js_handler;
pub use oculus::JsOculus;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        // A page may embed more than one wasm module; the first one to
        // install a subscriber wins.
        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}
