//! The `Oculus` class exported to JavaScript.

use std::cell::RefMut;

use miette::Diagnostic;
use oculus_browser::{
    BindOutcome, BrowserHost, BrowserOculus, Dispatcher, MirrorHost, OculusConfig, OculusError,
    selector_for_element,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::handler::js_handler;
use crate::types::{JsOculusConfig, JsScanReport};

/// Error message with the diagnostic code in front, e.g.
/// `oculus::handler_not_found: handler with name 'x' not found (...)`.
fn to_js_error(err: OculusError) -> JsError {
    match err.code() {
        Some(code) => JsError::new(&format!("{}: {}", code, err)),
        None => JsError::new(&err.to_string()),
    }
}

/// A mirroring context on the current document.
///
/// ```js
/// const oculus = new Oculus({ failurePolicy: "strict" });
/// oculus.addHandler("tooltip", (ours, theirs) => { ... });
/// oculus.init();
/// ```
#[wasm_bindgen(js_name = Oculus)]
pub struct JsOculus {
    inner: BrowserOculus,
}

impl JsOculus {
    /// Mutable access to the dispatcher, failing instead of panicking when
    /// called from inside a handler while a scan is running.
    fn dispatcher(&self) -> Result<RefMut<'_, Dispatcher<BrowserHost>>, JsError> {
        self.inner
            .dispatcher()
            .try_borrow_mut()
            .map_err(|_| JsError::new("Oculus is busy binding; call this after the handler returns"))
    }
}

#[wasm_bindgen(js_class = Oculus)]
impl JsOculus {
    /// Create a context. `config` may be omitted.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsOculus, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            OculusConfig::default()
        } else {
            let js: JsOculusConfig = serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
            OculusConfig::from(js)
        };

        let host = BrowserHost::from_window().ok_or_else(|| JsError::new("No document available"))?;
        let inner = BrowserOculus::new(host, config).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Register `handler(ours, theirs)` under `name`.
    ///
    /// A function returned by the handler is called when the pair is unbound.
    #[wasm_bindgen(js_name = addHandler)]
    pub fn add_handler(&self, name: &str, handler: js_sys::Function) -> Result<(), JsError> {
        self.dispatcher()?
            .register(name, js_handler(name.to_owned(), handler));
        Ok(())
    }

    /// Set the handler for elements without a handler list, or `null` for none.
    #[wasm_bindgen(js_name = setDefaultHandler)]
    pub fn set_default_handler(&self, name: Option<String>) -> Result<(), JsError> {
        self.dispatcher()?.set_default_handler(name.as_deref());
        Ok(())
    }

    /// Bind the current document and keep re-scanning for new elements.
    pub fn init(&mut self) -> Result<JsScanReport, JsError> {
        self.inner.start().map(Into::into).map_err(to_js_error)
    }

    /// Bind elements added since the last scan.
    pub fn scan(&self) -> Result<JsScanReport, JsError> {
        self.dispatcher()?.scan().map(Into::into).map_err(to_js_error)
    }

    /// A selector matching only `element`, tagging it with a marker class.
    ///
    /// Use it as the link attribute of an element created by script.
    #[wasm_bindgen(js_name = getSelectorForElement)]
    pub fn get_selector_for_element(element: &web_sys::Element) -> Result<String, JsError> {
        let document = element
            .owner_document()
            .ok_or_else(|| JsError::new("Element has no owner document"))?;
        Ok(selector_for_element(&BrowserHost::new(document), element))
    }

    /// Bind `ours` to `target`, a selector string or an element.
    ///
    /// Returns whether a new pair was bound.
    pub fn link(&self, ours: &web_sys::Element, target: JsValue) -> Result<bool, JsError> {
        let mut dispatcher = self.dispatcher()?;
        let theirs = if let Some(selector) = target.as_string() {
            dispatcher.host().query_all(&selector)
        } else if let Some(element) = target.dyn_ref::<web_sys::Element>() {
            vec![element.clone()]
        } else {
            return Err(JsError::new("link target must be a selector string or an Element"));
        };
        let outcome = dispatcher.link(ours, theirs).map_err(to_js_error)?;
        Ok(matches!(outcome, BindOutcome::Bound { .. }))
    }

    /// Release everything bound to `element`. Returns whether it was bound.
    pub fn unbind(&self, element: &web_sys::Element) -> Result<bool, JsError> {
        Ok(self.dispatcher()?.unbind(element))
    }

    /// Stop re-scanning. Existing pairs stay bound.
    pub fn stop(&mut self) -> bool {
        self.inner.stop()
    }

    #[wasm_bindgen(getter, js_name = boundCount)]
    pub fn bound_count(&self) -> Result<u32, JsError> {
        let count = self.dispatcher()?.bound_count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}
