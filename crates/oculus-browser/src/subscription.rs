//! Registrations returned by [`BrowserHost`](crate::BrowserHost).
//!
//! Every variant unregisters itself when dropped, so a `Binding` of these
//! releases its listeners, observers and timers with no further calls.

use gloo_events::EventListener;
use gloo_timers::callback::Interval;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;

/// A listener, observer, timer or page-supplied teardown.
pub enum BrowserSubscription {
    Listener(EventListener),
    Interval(Interval),
    Observer(ObserverHandle),
    Teardown(Teardown),
}

impl BrowserSubscription {
    /// Wrap a JS function to be called when the subscription is dropped.
    pub fn teardown(function: js_sys::Function) -> Self {
        BrowserSubscription::Teardown(Teardown(function))
    }
}

impl std::fmt::Debug for BrowserSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            BrowserSubscription::Listener(listener) => {
                return f
                    .debug_tuple("Listener")
                    .field(&listener.event_type())
                    .finish();
            }
            BrowserSubscription::Interval(_) => "Interval",
            BrowserSubscription::Observer(_) => "Observer",
            BrowserSubscription::Teardown(_) => "Teardown",
        };
        f.write_str(kind)
    }
}

/// A connected `MutationObserver` and the closure it calls.
///
/// Disconnects on drop. The closure must outlive the observer, so both are
/// held here.
pub struct ObserverHandle {
    observer: web_sys::MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>,
}

impl ObserverHandle {
    pub(crate) fn new(
        observer: web_sys::MutationObserver,
        callback: Closure<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>,
    ) -> Self {
        Self {
            observer,
            _callback: callback,
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// JS function called once on drop.
pub struct Teardown(js_sys::Function);

impl Drop for Teardown {
    fn drop(&mut self) {
        if let Err(e) = self.0.call0(&JsValue::NULL) {
            tracing::warn!("handler teardown threw: {:?}", e);
        }
    }
}
