//! Host abstraction for the DOM operations mirroring needs.
//!
//! The strategies never touch a DOM directly. They talk to a [`MirrorHost`],
//! which the browser crate implements with `web-sys` and the [`testkit`]
//! implements in memory. Host operations are best-effort: an operation on a
//! detached node must be inert rather than fail or panic.
//!
//! [`testkit`]: crate::testkit

use std::fmt;

/// Error type for host operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// DOM events the strategies listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Click,
    Change,
    KeyUp,
}

impl DomEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            DomEvent::Click => "click",
            DomEvent::Change => "change",
            DomEvent::KeyUp => "keyup",
        }
    }
}

impl fmt::Display for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean element state mirrored by the `state` and `value` strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Disabled,
    ReadOnly,
    Checked,
    Selected,
}

impl Flag {
    /// Content attribute name.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Flag::Disabled => "disabled",
            Flag::ReadOnly => "readonly",
            Flag::Checked => "checked",
            Flag::Selected => "selected",
        }
    }

    /// IDL property name on the element object.
    pub fn property_name(self) -> &'static str {
        match self {
            Flag::Disabled => "disabled",
            Flag::ReadOnly => "readOnly",
            Flag::Checked => "checked",
            Flag::Selected => "selected",
        }
    }
}

/// Which mutations an observer wants to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationFilter {
    pub attributes: bool,
    pub child_list: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl MutationFilter {
    /// Attribute changes on the target itself.
    pub const ATTRIBUTES: MutationFilter = MutationFilter {
        attributes: true,
        child_list: false,
        character_data: false,
        subtree: false,
    };

    /// Any change to the target's content or attributes, including descendants.
    pub const CONTENT: MutationFilter = MutationFilter {
        attributes: true,
        child_list: true,
        character_data: true,
        subtree: true,
    };
}

/// Mouse event fields carried from the visible element's click to the
/// synthetic click on the canonical element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickInit {
    pub screen_x: i32,
    pub screen_y: i32,
    pub client_x: i32,
    pub client_y: i32,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub meta_key: bool,
    pub button: i16,
    pub bubbles: bool,
    pub cancelable: bool,
}

/// Suppression methods of a host event.
pub trait EventControl {
    fn prevent_default(&self);
    fn stop_propagation(&self);
    fn stop_immediate_propagation(&self);
}

/// Classification of an element for strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<input>` other than checkbox, radio or hidden.
    TextInput,
    /// `<input type="checkbox">` or `<input type="radio">`.
    Toggle,
    /// `<input type="hidden">`.
    HiddenInput,
    TextArea,
    Select,
    Option,
    Other,
}

impl ElementKind {
    pub fn classify(tag_name: &str, input_type: Option<&str>) -> Self {
        match tag_name.to_ascii_lowercase().as_str() {
            "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
                Some("checkbox") | Some("radio") => ElementKind::Toggle,
                Some("hidden") => ElementKind::HiddenInput,
                _ => ElementKind::TextInput,
            },
            "textarea" => ElementKind::TextArea,
            "select" => ElementKind::Select,
            "option" => ElementKind::Option,
            _ => ElementKind::Other,
        }
    }

    /// An `<input>` element of any type.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            ElementKind::TextInput | ElementKind::Toggle | ElementKind::HiddenInput
        )
    }

    /// Elements whose value is mirrored as a string.
    pub fn is_input_like(self) -> bool {
        self.is_input() || self == ElementKind::TextArea
    }

    pub fn is_toggle(self) -> bool {
        self == ElementKind::Toggle
    }
}

/// The DOM operations the mirroring strategies are written against.
///
/// Implementations are cheap to clone (a handle to a document) and are only
/// used from one thread. Subscriptions returned by [`listen`](Self::listen),
/// [`observe`](Self::observe) and [`every`](Self::every) stay active until
/// they are dropped.
pub trait MirrorHost: Clone + 'static {
    /// Handle to a live element.
    type Element: Clone + PartialEq + fmt::Debug + 'static;
    /// Event delivered to listeners.
    type Event: EventControl + 'static;
    /// Listener, observer or timer registration. Dropping it unregisters.
    type Subscription: 'static;

    // === Lookup ===

    /// All connected elements matching `selector`, in document order.
    ///
    /// An invalid selector yields no elements.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// Short human-readable description for diagnostics.
    fn describe(&self, element: &Self::Element) -> String {
        format!("{element:?}")
    }

    /// Lowercase tag name.
    fn tag_name(&self, element: &Self::Element) -> String;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_class(&self, element: &Self::Element, class: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Classify the element by tag and `type` attribute.
    fn kind(&self, element: &Self::Element) -> ElementKind {
        let input_type = self.attribute(element, "type");
        ElementKind::classify(&self.tag_name(element), input_type.as_deref())
    }

    // === Element state ===

    fn value(&self, element: &Self::Element) -> String;

    fn set_value(&self, element: &Self::Element, value: &str);

    /// Selected option index of a select element, `-1` for none.
    fn selected_index(&self, element: &Self::Element) -> i32;

    fn set_selected_index(&self, element: &Self::Element, index: i32);

    /// Read the live property for `flag`.
    fn flag(&self, element: &Self::Element, flag: Flag) -> bool;

    /// Set the live property for `flag`.
    fn set_flag(&self, element: &Self::Element, flag: Flag, on: bool);

    /// Add or remove the content attribute for `flag`.
    fn set_flag_attribute(&self, element: &Self::Element, flag: Flag, on: bool);

    fn text(&self, element: &Self::Element) -> String;

    fn set_text(&self, element: &Self::Element, text: &str);

    fn inner_html(&self, element: &Self::Element) -> String;

    fn set_inner_html(&self, element: &Self::Element, html: &str);

    /// Computed `display` value.
    fn computed_display(&self, element: &Self::Element) -> String;

    /// Set the inline `display` style.
    fn set_display(&self, element: &Self::Element, display: &str);

    /// Remove the `style` attribute from every descendant.
    fn strip_descendant_styles(&self, element: &Self::Element);

    // === Events, observers, timers ===

    fn listen(
        &self,
        element: &Self::Element,
        event: DomEvent,
        handler: Box<dyn FnMut(&Self::Event)>,
    ) -> Result<Self::Subscription, PlatformError>;

    /// Call `callback` once per delivered batch of mutations matching `filter`.
    fn observe(
        &self,
        element: &Self::Element,
        filter: MutationFilter,
        callback: Box<dyn FnMut()>,
    ) -> Result<Self::Subscription, PlatformError>;

    /// Call `callback` every `period_ms` milliseconds.
    fn every(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Self::Subscription;

    /// Fire a bubbling `change` event, running listeners synchronously.
    fn dispatch_change(&self, element: &Self::Element);

    /// Extract the mouse fields of a click event.
    fn click_init(&self, event: &Self::Event) -> ClickInit;

    /// Fire a synthetic click built from `init` at `target`.
    ///
    /// Calling `preventDefault`, `stopPropagation` or
    /// `stopImmediatePropagation` on the synthetic event must also call it
    /// on `original`. Listeners run synchronously.
    fn dispatch_click(
        &self,
        target: &Self::Element,
        init: &ClickInit,
        original: &Self::Event,
    ) -> Result<(), PlatformError>;

    /// Fire a non-bubbling notification named `name` on `element`, carrying
    /// a reference to `linked`.
    fn emit(&self, element: &Self::Element, name: &str, linked: &Self::Element);
}
