//! `MirrorHost` over a live `web_sys::Document`.
//!
//! Mirroring is best-effort: a DOM call that throws is logged at `warn` and
//! treated as a no-op, so one misbehaving element cannot stop the others
//! from syncing.

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Interval;
use js_sys::{Object, Reflect};
use oculus_core::{ClickInit, DomEvent, Flag, MirrorHost, MutationFilter, PlatformError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::event::{BrowserEvent, click_init_from, forward_suppression, synthetic_click};
use crate::subscription::{BrowserSubscription, ObserverHandle};

/// Browser host bound to one document.
#[derive(Debug, Clone)]
pub struct BrowserHost {
    document: Document,
}

impl BrowserHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Host for the current window's document.
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn node_list_elements(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl MirrorHost for BrowserHost {
    type Element = Element;
    type Event = BrowserEvent;
    type Subscription = BrowserSubscription;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        match self.document.query_selector_all(selector) {
            Ok(list) => node_list_elements(&list),
            Err(e) => {
                tracing::warn!(selector, "querySelectorAll failed: {:?}", e);
                Vec::new()
            }
        }
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn describe(&self, element: &Element) -> String {
        let tag = element.tag_name().to_ascii_lowercase();
        let id = element.id();
        if id.is_empty() {
            format!("<{tag}>")
        } else {
            format!("<{tag}#{id}>")
        }
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(e) = element.class_list().add_1(class) {
            tracing::warn!(class, "classList.add failed: {:?}", e);
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        if let Err(e) = element.class_list().remove_1(class) {
            tracing::warn!(class, "classList.remove failed: {:?}", e);
        }
    }

    fn value(&self, element: &Element) -> String {
        if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
            input.value()
        } else if let Some(area) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn set_value(&self, element: &Element, value: &str) {
        if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn selected_index(&self, element: &Element) -> i32 {
        element
            .dyn_ref::<web_sys::HtmlSelectElement>()
            .map_or(-1, |select| select.selected_index())
    }

    fn set_selected_index(&self, element: &Element, index: i32) {
        if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
            select.set_selected_index(index);
        }
    }

    fn flag(&self, element: &Element, flag: Flag) -> bool {
        Reflect::get(element, &JsValue::from_str(flag.property_name()))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn set_flag(&self, element: &Element, flag: Flag, on: bool) {
        let key = JsValue::from_str(flag.property_name());
        if let Err(e) = Reflect::set(element, &key, &JsValue::from_bool(on)) {
            tracing::warn!(property = flag.property_name(), "property write failed: {:?}", e);
        }
    }

    fn set_flag_attribute(&self, element: &Element, flag: Flag, on: bool) {
        let name = flag.attribute_name();
        let result = if on {
            element.set_attribute(name, name)
        } else {
            element.remove_attribute(name)
        };
        if let Err(e) = result {
            tracing::warn!(attribute = name, "attribute write failed: {:?}", e);
        }
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn inner_html(&self, element: &Element) -> String {
        element.inner_html()
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn computed_display(&self, element: &Element) -> String {
        let Some(window) = self.document.default_view() else {
            return String::new();
        };
        match window.get_computed_style(element) {
            Ok(Some(style)) => style.get_property_value("display").unwrap_or_default(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("getComputedStyle failed: {:?}", e);
                String::new()
            }
        }
    }

    fn set_display(&self, element: &Element, display: &str) {
        let Some(html) = element.dyn_ref::<web_sys::HtmlElement>() else {
            return;
        };
        if let Err(e) = html.style().set_property("display", display) {
            let display_value = display;
            tracing::warn!(display = display_value, "style write failed: {:?}", e);
        }
    }

    fn strip_descendant_styles(&self, element: &Element) {
        let styled = match element.query_selector_all("[style]") {
            Ok(list) => node_list_elements(&list),
            Err(e) => {
                tracing::warn!("querySelectorAll failed: {:?}", e);
                return;
            }
        };
        for descendant in styled {
            if let Err(e) = descendant.remove_attribute("style") {
                tracing::warn!("removing style failed: {:?}", e);
            }
        }
    }

    fn listen(
        &self,
        element: &Element,
        event: DomEvent,
        mut handler: Box<dyn FnMut(&BrowserEvent)>,
    ) -> Result<BrowserSubscription, PlatformError> {
        // Click forwarding may call preventDefault, so the listener can't be passive.
        let listener = EventListener::new_with_options(
            element,
            event.as_str(),
            EventListenerOptions::enable_prevent_default(),
            move |e: &web_sys::Event| handler(&BrowserEvent(e.clone())),
        );
        Ok(BrowserSubscription::Listener(listener))
    }

    fn observe(
        &self,
        element: &Element,
        filter: MutationFilter,
        mut callback: Box<dyn FnMut()>,
    ) -> Result<BrowserSubscription, PlatformError> {
        let closure = Closure::<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: web_sys::MutationObserver| callback(),
        );
        let observer = web_sys::MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| format!("MutationObserver construction failed: {:?}", e))?;

        let init = web_sys::MutationObserverInit::new();
        init.set_attributes(filter.attributes);
        init.set_child_list(filter.child_list);
        init.set_character_data(filter.character_data);
        init.set_subtree(filter.subtree);
        observer
            .observe_with_options(element, &init)
            .map_err(|e| format!("MutationObserver.observe failed: {:?}", e))?;

        Ok(BrowserSubscription::Observer(ObserverHandle::new(
            observer, closure,
        )))
    }

    fn every(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> BrowserSubscription {
        BrowserSubscription::Interval(Interval::new(period_ms, callback))
    }

    fn dispatch_change(&self, element: &Element) {
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        let event = match web_sys::Event::new_with_event_init_dict("change", &init) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("change event construction failed: {:?}", e);
                return;
            }
        };
        if let Err(e) = element.dispatch_event(&event) {
            tracing::warn!("change dispatch failed: {:?}", e);
        }
    }

    fn click_init(&self, event: &BrowserEvent) -> ClickInit {
        click_init_from(event.inner())
    }

    fn dispatch_click(
        &self,
        target: &Element,
        init: &ClickInit,
        original: &BrowserEvent,
    ) -> Result<(), PlatformError> {
        let click = synthetic_click(init)?;
        let _forwarding = forward_suppression(&click, original.inner())?;
        target
            .dispatch_event(&click)
            .map_err(|e| format!("click dispatch failed: {:?}", e))?;
        Ok(())
    }

    fn emit(&self, element: &Element, name: &str, linked: &Element) {
        let detail = Object::new();
        if let Err(e) = Reflect::set(&detail, &JsValue::from_str("theirs"), linked) {
            tracing::warn!("building event detail failed: {:?}", e);
            return;
        }
        let init = web_sys::CustomEventInit::new();
        init.set_bubbles(false);
        init.set_detail(&detail);
        let event = match web_sys::CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(name, "custom event construction failed: {:?}", e);
                return;
            }
        };
        if let Err(e) = element.dispatch_event(&event) {
            tracing::warn!(name, "custom event dispatch failed: {:?}", e);
        }
    }
}
