//! Event wrapper and synthetic click construction.

use js_sys::{Function, Reflect};
use oculus_core::{ClickInit, EventControl, PlatformError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Event delivered to strategy listeners.
#[derive(Debug, Clone)]
pub struct BrowserEvent(pub web_sys::Event);

impl BrowserEvent {
    pub fn inner(&self) -> &web_sys::Event {
        &self.0
    }
}

impl EventControl for BrowserEvent {
    fn prevent_default(&self) {
        self.0.prevent_default();
    }

    fn stop_propagation(&self) {
        self.0.stop_propagation();
    }

    fn stop_immediate_propagation(&self) {
        self.0.stop_immediate_propagation();
    }
}

/// Read the mouse fields of `event`. Non-mouse events keep only the flags.
pub fn click_init_from(event: &web_sys::Event) -> ClickInit {
    let mut init = ClickInit {
        bubbles: event.bubbles(),
        cancelable: event.cancelable(),
        ..ClickInit::default()
    };
    if let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() {
        init.screen_x = mouse.screen_x();
        init.screen_y = mouse.screen_y();
        init.client_x = mouse.client_x();
        init.client_y = mouse.client_y();
        init.ctrl_key = mouse.ctrl_key();
        init.alt_key = mouse.alt_key();
        init.shift_key = mouse.shift_key();
        init.meta_key = mouse.meta_key();
        init.button = mouse.button();
    }
    init
}

/// Build a `click` MouseEvent carrying `init`.
pub fn synthetic_click(init: &ClickInit) -> Result<web_sys::MouseEvent, PlatformError> {
    let dict = web_sys::MouseEventInit::new();
    dict.set_bubbles(init.bubbles);
    dict.set_cancelable(init.cancelable);
    dict.set_screen_x(init.screen_x);
    dict.set_screen_y(init.screen_y);
    dict.set_client_x(init.client_x);
    dict.set_client_y(init.client_y);
    dict.set_ctrl_key(init.ctrl_key);
    dict.set_alt_key(init.alt_key);
    dict.set_shift_key(init.shift_key);
    dict.set_meta_key(init.meta_key);
    dict.set_button(init.button);

    let event = web_sys::MouseEvent::new_with_mouse_event_init_dict("click", &dict)
        .map_err(|e| format!("MouseEvent construction failed: {:?}", e))?;
    Ok(event)
}

/// Shadowed suppression methods on a synthetic event.
///
/// Each override calls the event's own method and then the same method on
/// the original event. Dropping this removes the overrides again, so a
/// listener that keeps the event and calls them later reaches the native
/// methods only.
pub struct Forwarding {
    synthetic: web_sys::Event,
    closures: Vec<Closure<dyn Fn()>>,
}

impl Drop for Forwarding {
    fn drop(&mut self) {
        for method in FORWARDED.iter().take(self.closures.len()) {
            if let Err(e) = Reflect::delete_property(&self.synthetic, &JsValue::from_str(method)) {
                tracing::warn!("restoring {} failed: {:?}", method, e);
            }
        }
    }
}

const FORWARDED: [&str; 3] = [
    "preventDefault",
    "stopPropagation",
    "stopImmediatePropagation",
];

/// Make suppression calls on `synthetic` reach `original` too.
pub fn forward_suppression(
    synthetic: &web_sys::Event,
    original: &web_sys::Event,
) -> Result<Forwarding, PlatformError> {
    let mut forwarding = Forwarding {
        synthetic: synthetic.clone(),
        closures: Vec::with_capacity(FORWARDED.len()),
    };
    for method in FORWARDED {
        let key = JsValue::from_str(method);
        let native: Function = Reflect::get(synthetic, &key)
            .map_err(|e| format!("reading {method} failed: {:?}", e))?
            .dyn_into()
            .map_err(|_| format!("{method} is not a function"))?;

        let this = synthetic.clone();
        let original = original.clone();
        let closure = Closure::<dyn Fn()>::new(move || {
            if let Err(e) = native.call0(&this) {
                tracing::warn!("native {} threw: {:?}", method, e);
            }
            match method {
                "preventDefault" => original.prevent_default(),
                "stopPropagation" => original.stop_propagation(),
                _ => original.stop_immediate_propagation(),
            }
        });

        Reflect::set(synthetic, &key, closure.as_ref())
            .map_err(|e| format!("overriding {method} failed: {:?}", e))?;
        forwarding.closures.push(closure);
    }
    Ok(forwarding)
}
