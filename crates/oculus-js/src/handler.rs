//! Handlers written in JavaScript.

use js_sys::{Array, Function};
use oculus_browser::{Binding, BrowserHost, BrowserSubscription, Handler, PlatformError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Wrap `function(ours, theirs)` as a handler.
///
/// `theirs` is passed as an array of the linked elements. If the function
/// returns a function, it is called when the pair is unbound.
pub fn js_handler(name: String, function: Function) -> Handler<BrowserHost> {
    Handler::<BrowserHost>::custom(move |_cx, pair| {
        let theirs: Array = pair.theirs().iter().collect();
        let returned = function
            .call2(&JsValue::NULL, &pair.ours, &theirs)
            .map_err(|e| PlatformError(format!("handler '{name}' threw: {:?}", e)))?;

        let mut binding = Binding::new();
        if let Some(teardown) = returned.dyn_ref::<Function>() {
            binding.push(BrowserSubscription::teardown(teardown.clone()));
        }
        Ok(binding)
    })
}
