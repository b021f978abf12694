//! In-memory [`MirrorHost`] for tests.
//!
//! `FakeDom` keeps a flat list of elements (no tree) with just enough
//! behaviour to drive the strategies:
//!
//! - events are dispatched synchronously, like `dispatchEvent`
//! - mutations are queued and delivered in batches by [`FakeDom::flush_mutations`]
//! - timers run on a virtual clock moved by [`FakeDom::advance`]
//! - `disabled`/`readonly` properties reflect their attributes, while
//!   `checked`/`selected` properties diverge once written, as in a browser
//!
//! Selectors support one compound per comma-separated item: a tag, `#id`,
//! `.class`, `[attr]` and `[attr=value]`. Combinators match nothing.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use crate::host::{
    ClickInit, DomEvent, EventControl, Flag, MirrorHost, MutationFilter, PlatformError,
};

/// Handle to an element in a [`FakeDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    Attributes,
    ChildList,
    CharacterData,
}

impl MutationKind {
    fn matches(self, filter: &MutationFilter) -> bool {
        match self {
            MutationKind::Attributes => filter.attributes,
            MutationKind::ChildList => filter.child_list,
            MutationKind::CharacterData => filter.character_data,
        }
    }
}

#[derive(Debug, Default)]
struct EventFlags {
    cancelable: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
}

impl EventFlags {
    fn new(cancelable: bool) -> Rc<Self> {
        Rc::new(Self {
            cancelable,
            ..Self::default()
        })
    }

    fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.set(true);
        }
    }

    fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }
}

/// Event delivered to [`FakeDom`] listeners.
#[derive(Debug, Clone)]
pub struct FakeEvent {
    kind: DomEvent,
    init: ClickInit,
    flags: Rc<EventFlags>,
    /// Original event of a synthetic click; suppression calls are forwarded to it.
    forward: Option<Rc<EventFlags>>,
}

impl FakeEvent {
    fn new(kind: DomEvent, init: ClickInit) -> Self {
        Self {
            kind,
            init,
            flags: EventFlags::new(init.cancelable),
            forward: None,
        }
    }

    pub fn kind(&self) -> DomEvent {
        self.kind
    }

    pub fn init(&self) -> &ClickInit {
        &self.init
    }

    pub fn default_prevented(&self) -> bool {
        self.flags.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.flags.propagation_stopped.get()
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.flags.immediate_stopped.get()
    }
}

impl EventControl for FakeEvent {
    fn prevent_default(&self) {
        self.flags.prevent_default();
        if let Some(original) = &self.forward {
            original.prevent_default();
        }
    }

    fn stop_propagation(&self) {
        self.flags.stop_propagation();
        if let Some(original) = &self.forward {
            original.stop_propagation();
        }
    }

    fn stop_immediate_propagation(&self) {
        self.flags.stop_immediate_propagation();
        if let Some(original) = &self.forward {
            original.stop_immediate_propagation();
        }
    }
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    value: String,
    selected_index: i32,
    /// Dirty `checked`/`selected` properties.
    props: HashMap<Flag, bool>,
    text: String,
    html: String,
    display: Option<String>,
    connected: bool,
    html_writes: usize,
    change_events: usize,
    clicks: Vec<ClickInit>,
    emitted: Vec<(String, NodeId)>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            value: String::new(),
            selected_index: -1,
            props: HashMap::new(),
            text: String::new(),
            html: String::new(),
            display: None,
            connected: true,
            html_writes: 0,
            change_events: 0,
            clicks: Vec::new(),
            emitted: Vec::new(),
        }
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace())
            .into_iter()
            .flatten()
    }
}

type ListenerFn = Rc<RefCell<Box<dyn FnMut(&FakeEvent)>>>;
type CallbackFn = Rc<RefCell<Box<dyn FnMut()>>>;

struct ListenerEntry {
    id: u64,
    target: NodeId,
    event: DomEvent,
    handler: ListenerFn,
}

struct ObserverEntry {
    id: u64,
    target: NodeId,
    filter: MutationFilter,
    callback: CallbackFn,
}

struct TimerEntry {
    id: u64,
    period: u64,
    next_due: u64,
    callback: CallbackFn,
}

#[derive(Default)]
struct DomState {
    nodes: Vec<NodeData>,
    listeners: Vec<ListenerEntry>,
    observers: Vec<ObserverEntry>,
    timers: Vec<TimerEntry>,
    pending: Vec<(NodeId, MutationKind)>,
    next_id: u64,
    now: u64,
}

impl DomState {
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, id: NodeId, kind: MutationKind) {
        self.pending.push((id, kind));
    }
}

/// Registration in a [`FakeDom`]. Dropping it unregisters.
pub struct FakeSubscription {
    dom: Weak<RefCell<DomState>>,
    id: u64,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        let Some(state) = self.dom.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();
        let id = self.id;
        state.listeners.retain(|l| l.id != id);
        state.observers.retain(|o| o.id != id);
        state.timers.retain(|t| t.id != id);
    }
}

/// In-memory document.
#[derive(Clone, Default)]
pub struct FakeDom {
    state: Rc<RefCell<DomState>>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    // === Building ===

    /// Create a connected element.
    pub fn create(&self, tag: &str) -> NodeId {
        let mut state = self.state.borrow_mut();
        state.nodes.push(NodeData::new(tag));
        NodeId(state.nodes.len() - 1)
    }

    /// Create a connected element with attributes.
    pub fn create_with(&self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let id = self.create(tag);
        let mut state = self.state.borrow_mut();
        for (name, value) in attributes {
            state
                .node_mut(id)
                .attributes
                .insert((*name).to_owned(), (*value).to_owned());
        }
        id
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        state
            .node_mut(id)
            .attributes
            .insert(name.to_owned(), value.to_owned());
        state.record(id, MutationKind::Attributes);
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) {
        let mut state = self.state.borrow_mut();
        if state.node_mut(id).attributes.remove(name).is_some() {
            state.record(id, MutationKind::Attributes);
        }
    }

    /// Set the inline `display` style, as a page script would.
    pub fn set_style_display(&self, id: NodeId, display: &str) {
        let mut state = self.state.borrow_mut();
        state.node_mut(id).display = Some(display.to_owned());
        state.record(id, MutationKind::Attributes);
    }

    /// Edit the element's text node in place.
    pub fn set_character_data(&self, id: NodeId, text: &str) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(id);
        node.text = text.to_owned();
        node.html = text.to_owned();
        state.record(id, MutationKind::CharacterData);
    }

    /// Remove the element from the document.
    pub fn detach(&self, id: NodeId) {
        let mut state = self.state.borrow_mut();
        state.node_mut(id).connected = false;
        state.record(id, MutationKind::ChildList);
    }

    // === User interaction ===

    /// Simulate typing: set the value and fire `keyup`.
    pub fn type_text(&self, id: NodeId, value: &str) {
        self.state.borrow_mut().node_mut(id).value = value.to_owned();
        self.fire(id, DomEvent::KeyUp);
    }

    /// Simulate picking an option: set `selectedIndex` and fire `change`.
    pub fn choose(&self, id: NodeId, index: i32) {
        self.state.borrow_mut().node_mut(id).selected_index = index;
        self.dispatch_change(&id);
    }

    /// Simulate a user click with the given mouse fields.
    pub fn click(&self, id: NodeId, init: ClickInit) -> FakeEvent {
        let event = FakeEvent::new(DomEvent::Click, init);
        self.run_listeners(id, &event);
        event
    }

    /// Fire a plain event of `kind`.
    pub fn fire(&self, id: NodeId, kind: DomEvent) -> FakeEvent {
        let event = FakeEvent::new(
            kind,
            ClickInit {
                bubbles: true,
                ..ClickInit::default()
            },
        );
        if kind == DomEvent::Change {
            self.state.borrow_mut().node_mut(id).change_events += 1;
        }
        self.run_listeners(id, &event);
        event
    }

    // === Scheduling ===

    /// Deliver queued mutations, one callback per observer per batch.
    pub fn flush_mutations(&self) {
        let batch = std::mem::take(&mut self.state.borrow_mut().pending);
        if batch.is_empty() {
            return;
        }

        let to_call: Vec<(u64, CallbackFn)> = {
            let state = self.state.borrow();
            state
                .observers
                .iter()
                .filter(|observer| {
                    batch.iter().any(|(target, kind)| {
                        *target == observer.target && kind.matches(&observer.filter)
                    })
                })
                .map(|observer| (observer.id, observer.callback.clone()))
                .collect()
        };

        for (id, callback) in to_call {
            if !self.state.borrow().observers.iter().any(|o| o.id == id) {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)();
            }
        }
    }

    /// Move the virtual clock forward, running due timers in order.
    pub fn advance(&self, ms: u64) {
        let target = self.state.borrow().now + ms;
        loop {
            let due = {
                let mut state = self.state.borrow_mut();
                state
                    .timers
                    .iter_mut()
                    .filter(|timer| timer.next_due <= target)
                    .min_by_key(|timer| (timer.next_due, timer.id))
                    .map(|timer| {
                        let due_at = timer.next_due;
                        timer.next_due += timer.period;
                        (due_at, timer.callback.clone())
                    })
            };
            let Some((due_at, callback)) = due else {
                break;
            };
            self.state.borrow_mut().now = due_at;
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)();
            }
        }
        self.state.borrow_mut().now = target;
    }

    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    // === Inspection ===

    pub fn html_writes(&self, id: NodeId) -> usize {
        self.state.borrow().node(id).html_writes
    }

    /// Number of `change` events fired at the element.
    pub fn change_events(&self, id: NodeId) -> usize {
        self.state.borrow().node(id).change_events
    }

    /// Mouse fields of every click fired at the element by `dispatch_click`.
    pub fn synthetic_clicks(&self, id: NodeId) -> Vec<ClickInit> {
        self.state.borrow().node(id).clicks.clone()
    }

    pub fn emitted(&self, id: NodeId) -> Vec<(String, NodeId)> {
        self.state.borrow().node(id).emitted.clone()
    }

    pub fn display(&self, id: NodeId) -> Option<String> {
        self.state.borrow().node(id).display.clone()
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.state.borrow().node(id).attributes.contains_key(name)
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn timer_count(&self) -> usize {
        self.state.borrow().timers.len()
    }

    fn subscription(&self, id: u64) -> FakeSubscription {
        FakeSubscription {
            dom: Rc::downgrade(&self.state),
            id,
        }
    }

    fn run_listeners(&self, target: NodeId, event: &FakeEvent) {
        let handlers: Vec<(u64, ListenerFn)> = {
            let state = self.state.borrow();
            state
                .listeners
                .iter()
                .filter(|l| l.target == target && l.event == event.kind)
                .map(|l| (l.id, l.handler.clone()))
                .collect()
        };

        for (id, handler) in handlers {
            if event.immediate_propagation_stopped() {
                break;
            }
            if !self.state.borrow().listeners.iter().any(|l| l.id == id) {
                continue;
            }
            // A listener re-entering itself is skipped.
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event);
            }
        }
    }

    fn matches(node: &NodeData, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if node.attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|class| node.classes().any(|c| c == class))
        {
            return false;
        }
        compound
            .attributes
            .iter()
            .all(|(name, value)| match (node.attributes.get(name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
    }
}

impl MirrorHost for FakeDom {
    type Element = NodeId;
    type Event = FakeEvent;
    type Subscription = FakeSubscription;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(compounds) = selector
            .split(',')
            .map(parse_compound)
            .collect::<Option<Vec<_>>>()
        else {
            return Vec::new();
        };

        let state = self.state.borrow();
        state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.connected)
            .filter(|(_, node)| compounds.iter().any(|c| Self::matches(node, c)))
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        self.state.borrow().node(*element).connected
    }

    fn describe(&self, element: &NodeId) -> String {
        let state = self.state.borrow();
        let node = state.node(*element);
        match node.attributes.get("id") {
            Some(id) => format!("<{}#{}>", node.tag, id),
            None => format!("<{}> (node {})", node.tag, element.0),
        }
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.state.borrow().node(*element).tag.clone()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.state
            .borrow()
            .node(*element)
            .attributes
            .get(name)
            .cloned()
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.state
            .borrow()
            .node(*element)
            .classes()
            .any(|c| c == class)
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        let classes = match node.attributes.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        node.attributes.insert("class".to_owned(), classes);
        state.record(*element, MutationKind::Attributes);
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        if !self.has_class(element, class) {
            return;
        }
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        let remaining: Vec<&str> = node.classes().filter(|c| *c != class).collect();
        let remaining = remaining.join(" ");
        node.attributes.insert("class".to_owned(), remaining);
        state.record(*element, MutationKind::Attributes);
    }

    fn value(&self, element: &NodeId) -> String {
        self.state.borrow().node(*element).value.clone()
    }

    fn set_value(&self, element: &NodeId, value: &str) {
        self.state.borrow_mut().node_mut(*element).value = value.to_owned();
    }

    fn selected_index(&self, element: &NodeId) -> i32 {
        self.state.borrow().node(*element).selected_index
    }

    fn set_selected_index(&self, element: &NodeId, index: i32) {
        self.state.borrow_mut().node_mut(*element).selected_index = index;
    }

    fn flag(&self, element: &NodeId, flag: Flag) -> bool {
        let state = self.state.borrow();
        let node = state.node(*element);
        match flag {
            Flag::Disabled | Flag::ReadOnly => node.attributes.contains_key(flag.attribute_name()),
            Flag::Checked | Flag::Selected => node
                .props
                .get(&flag)
                .copied()
                .unwrap_or_else(|| node.attributes.contains_key(flag.attribute_name())),
        }
    }

    fn set_flag(&self, element: &NodeId, flag: Flag, on: bool) {
        match flag {
            Flag::Disabled | Flag::ReadOnly => self.set_flag_attribute(element, flag, on),
            Flag::Checked | Flag::Selected => {
                self.state
                    .borrow_mut()
                    .node_mut(*element)
                    .props
                    .insert(flag, on);
            }
        }
    }

    fn set_flag_attribute(&self, element: &NodeId, flag: Flag, on: bool) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        let name = flag.attribute_name();
        let changed = if on {
            node.attributes.insert(name.to_owned(), String::new()).is_none()
        } else {
            node.attributes.remove(name).is_some()
        };
        if changed {
            state.record(*element, MutationKind::Attributes);
        }
    }

    fn text(&self, element: &NodeId) -> String {
        self.state.borrow().node(*element).text.clone()
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        node.text = text.to_owned();
        node.html = text.to_owned();
        state.record(*element, MutationKind::ChildList);
    }

    fn inner_html(&self, element: &NodeId) -> String {
        self.state.borrow().node(*element).html.clone()
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        node.html = html.to_owned();
        node.text = strip_tags(html);
        node.html_writes += 1;
        state.record(*element, MutationKind::ChildList);
    }

    fn computed_display(&self, element: &NodeId) -> String {
        self.state
            .borrow()
            .node(*element)
            .display
            .clone()
            .unwrap_or_else(|| "block".to_owned())
    }

    fn set_display(&self, element: &NodeId, display: &str) {
        let mut state = self.state.borrow_mut();
        state.node_mut(*element).display = Some(display.to_owned());
        state.record(*element, MutationKind::Attributes);
    }

    fn strip_descendant_styles(&self, element: &NodeId) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(*element);
        let stripped = strip_style_attributes(&node.html);
        if stripped != node.html {
            node.html = stripped;
            state.record(*element, MutationKind::Attributes);
        }
    }

    fn listen(
        &self,
        element: &NodeId,
        event: DomEvent,
        handler: Box<dyn FnMut(&FakeEvent)>,
    ) -> Result<FakeSubscription, PlatformError> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.listeners.push(ListenerEntry {
            id,
            target: *element,
            event,
            handler: Rc::new(RefCell::new(handler)),
        });
        drop(state);
        Ok(self.subscription(id))
    }

    fn observe(
        &self,
        element: &NodeId,
        filter: MutationFilter,
        callback: Box<dyn FnMut()>,
    ) -> Result<FakeSubscription, PlatformError> {
        if filter == MutationFilter::default() {
            return Err(PlatformError::from(
                "observe requires at least one of attributes, childList or characterData",
            ));
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.observers.push(ObserverEntry {
            id,
            target: *element,
            filter,
            callback: Rc::new(RefCell::new(callback)),
        });
        drop(state);
        Ok(self.subscription(id))
    }

    fn every(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> FakeSubscription {
        let period = u64::from(period_ms.max(1));
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let next_due = state.now + period;
        state.timers.push(TimerEntry {
            id,
            period,
            next_due,
            callback: Rc::new(RefCell::new(callback)),
        });
        drop(state);
        self.subscription(id)
    }

    fn dispatch_change(&self, element: &NodeId) {
        self.fire(*element, DomEvent::Change);
    }

    fn click_init(&self, event: &FakeEvent) -> ClickInit {
        event.init
    }

    fn dispatch_click(
        &self,
        target: &NodeId,
        init: &ClickInit,
        original: &FakeEvent,
    ) -> Result<(), PlatformError> {
        let mut event = FakeEvent::new(DomEvent::Click, *init);
        event.forward = Some(original.flags.clone());
        self.state.borrow_mut().node_mut(*target).clicks.push(*init);
        self.run_listeners(*target, &event);
        Ok(())
    }

    fn emit(&self, element: &NodeId, name: &str, linked: &NodeId) {
        self.state
            .borrow_mut()
            .node_mut(*element)
            .emitted
            .push((name.to_owned(), *linked));
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_compound(selector: &str) -> Option<Compound> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    let mut compound = Compound::default();
    let is_delimiter = |c: char| matches!(c, '#' | '.' | '[');

    let tag_len = selector.find(is_delimiter).unwrap_or(selector.len());
    let (tag, mut rest) = selector.split_at(tag_len);
    if !tag.is_empty() && tag != "*" {
        if !is_name(tag) {
            return None;
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let body = &rest[1..];
                let end = body.find(is_delimiter).unwrap_or(body.len());
                let name = &body[..end];
                if !is_name(name) {
                    return None;
                }
                if first == '#' {
                    compound.id = Some(name.to_owned());
                } else {
                    compound.classes.push(name.to_owned());
                }
                rest = &body[end..];
            }
            '[' => {
                let end = rest.find(']')?;
                let inner = &rest[1..end];
                let (name, value) = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim(),
                        Some(value.trim().trim_matches(['"', '\'']).to_owned()),
                    ),
                    None => (inner.trim(), None),
                };
                if !is_name(name) {
                    return None;
                }
                compound.attributes.push((name.to_owned(), value));
                rest = &rest[end + 1..];
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn strip_style_attributes(html: &str) -> String {
    const NEEDLE: &str = " style=";
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find(NEEDLE) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + NEEDLE.len()..];
        match after.chars().next() {
            Some(quote @ ('"' | '\'')) => match after[1..].find(quote) {
                Some(end) => rest = &after[end + 2..],
                None => rest = "",
            },
            _ => {
                out.push_str(NEEDLE);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
