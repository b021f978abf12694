//! Whole-page scenarios driven through `Oculus` on the in-memory host.

use oculus_core::testkit::{FakeDom, FakeEvent, NodeId};
use oculus_core::{
    Binding, ClickInit, DomEvent, EventControl, Flag, Handler, MirrorHost, Oculus, OculusConfig,
    OculusError,
};

fn visible(dom: &FakeDom, tag: &str, link: &str, handlers: Option<&str>) -> NodeId {
    let ours = dom.create_with(tag, &[("data-oculus-element", link)]);
    if let Some(handlers) = handlers {
        dom.set_attribute(ours, "data-oculus-handlers", handlers);
    }
    ours
}

fn started(dom: &FakeDom, config: OculusConfig) -> Oculus<FakeDom> {
    let mut oculus = Oculus::new(dom.clone(), config).unwrap();
    oculus.start().unwrap();
    oculus
}

#[test]
fn hidden_price_mirrors_value_and_state() {
    let dom = FakeDom::new();
    let price = dom.create_with("input", &[("id", "hidden-price"), ("type", "text")]);
    let ours = visible(&dom, "input", "#hidden-price", Some("value state"));

    let oculus = started(&dom, OculusConfig::default());
    assert_eq!(oculus.bound_count(), 1);
    assert!(dom.has_class(&ours, "js-oculus-setup"));
    assert_eq!(
        oculus
            .dispatcher()
            .borrow()
            .handlers_of(&ours)
            .map(|names| names.iter().map(|n| n.as_str()).collect::<Vec<_>>()),
        Some(vec!["value", "state"])
    );

    // Typing in the visible input updates the canonical one and fires its change.
    let changes_before = dom.change_events(price);
    dom.type_text(ours, "42.50");
    assert_eq!(dom.value(&price), "42.50");
    assert_eq!(dom.change_events(price), changes_before + 1);

    // Disabling the canonical input disables the visible one.
    dom.set_attribute(price, "disabled", "disabled");
    dom.flush_mutations();
    assert!(dom.flag(&ours, Flag::Disabled));

    dom.remove_attribute(price, "disabled");
    dom.flush_mutations();
    assert!(!dom.flag(&ours, Flag::Disabled));

    // A script writing the canonical value is picked up by the poll.
    dom.set_value(&price, "39.99");
    dom.advance(50);
    assert_eq!(dom.value(&ours), "39.99");
}

#[test]
fn select_without_handler_list_gets_value() {
    let dom = FakeDom::new();
    let theirs = dom.create_with("select", &[("id", "size")]);
    let ours = visible(&dom, "select", "#size", None);

    let oculus = started(&dom, OculusConfig::default());
    assert_eq!(
        oculus
            .dispatcher()
            .borrow()
            .handlers_of(&ours)
            .map(|names| names.to_vec()),
        Some(vec!["value".into()])
    );

    dom.choose(ours, 2);
    assert_eq!(dom.selected_index(&theirs), 2);
    assert_eq!(dom.change_events(theirs), 1);

    dom.choose(theirs, 1);
    assert_eq!(dom.selected_index(&ours), 1);
}

#[test]
fn default_click_forwards_suppression() {
    let dom = FakeDom::new();
    let button = dom.create_with("button", &[("id", "buy")]);
    let ours = visible(&dom, "a", "#buy", None);
    let _oculus = started(&dom, OculusConfig::default());

    let _cancel = dom
        .listen(
            &button,
            DomEvent::Click,
            Box::new(|event: &FakeEvent| event.prevent_default()),
        )
        .unwrap();

    let original = dom.click(
        ours,
        ClickInit {
            client_x: 12,
            client_y: 34,
            shift_key: true,
            bubbles: true,
            cancelable: true,
            ..ClickInit::default()
        },
    );
    let clicks = dom.synthetic_clicks(button);
    assert_eq!(clicks.len(), 1);
    assert_eq!((clicks[0].client_x, clicks[0].client_y), (12, 34));
    assert!(clicks[0].shift_key);
    assert!(original.default_prevented());
}

#[test]
fn late_target_is_bound_by_rescan() {
    let dom = FakeDom::new();
    let ours = visible(&dom, "span", ".late", Some("text"));
    let oculus = started(&dom, OculusConfig::default());
    assert_eq!(oculus.bound_count(), 0);
    assert!(!dom.has_class(&ours, "js-oculus-setup"));

    let theirs = dom.create_with("span", &[("class", "late")]);
    dom.set_character_data(theirs, "arrived");
    dom.advance(50);
    assert_eq!(oculus.bound_count(), 1);
    assert_eq!(dom.text(&ours), "arrived");

    dom.set_character_data(theirs, "updated");
    dom.flush_mutations();
    assert_eq!(dom.text(&ours), "updated");
}

#[test]
fn strict_policy_fails_start() {
    let dom = FakeDom::new();
    dom.create_with("div", &[("id", "src")]);
    let ours = visible(&dom, "div", "#src", Some("carousel"));

    let mut strict = Oculus::new(dom.clone(), OculusConfig::strict()).unwrap();
    let err = strict.start().unwrap_err();
    assert!(matches!(
        err,
        OculusError::HandlerNotFound { ref name, .. } if name == "carousel"
    ));
    assert!(!strict.is_running());
    assert_eq!(dom.timer_count(), 0);
    assert!(!dom.has_class(&ours, "js-oculus-setup"));
    drop(strict);

    let lenient = started(&dom, OculusConfig::default());
    assert!(lenient.is_running());
    assert_eq!(lenient.bound_count(), 1);
    assert!(dom.has_class(&ours, "js-oculus-setup"));
}

#[test]
fn handler_registered_after_start() {
    let dom = FakeDom::new();
    dom.create_with("div", &[("id", "src"), ("data-label", "Sale")]);
    let oculus = started(&dom, OculusConfig::default());

    oculus.register(
        "label",
        Handler::<FakeDom>::custom(|cx, pair| {
            let label = cx
                .host
                .attribute(pair.primary(), "data-label")
                .unwrap_or_default();
            cx.host.set_text(&pair.ours, &label);
            Ok(Binding::new())
        }),
    );
    let ours = visible(&dom, "div", "#src", Some("label"));
    dom.advance(50);
    assert_eq!(dom.text(&ours), "Sale");
}

#[test]
fn removed_pairs_are_released() {
    let dom = FakeDom::new();
    let theirs = dom.create_with("div", &[("id", "panel")]);
    let ours = visible(&dom, "div", "#panel", Some("visibility html"));
    let mut oculus = started(&dom, OculusConfig::default());
    assert_eq!(oculus.bound_count(), 1);
    // Re-scan timer plus the markup poll.
    assert_eq!(dom.timer_count(), 2);

    dom.set_style_display(theirs, "none");
    dom.flush_mutations();
    assert_eq!(dom.display(ours).as_deref(), Some("none"));
    assert_eq!(
        dom.emitted(ours).last(),
        Some(&("oculus:visibility".to_owned(), theirs))
    );

    dom.detach(ours);
    dom.advance(50);
    assert_eq!(oculus.bound_count(), 0);
    assert_eq!(dom.observer_count(), 0);
    assert_eq!(dom.timer_count(), 1);

    oculus.stop();
    assert_eq!(dom.timer_count(), 0);
}

#[test]
fn independent_contexts_have_separate_registries() {
    let dom = FakeDom::new();
    dom.create_with("div", &[("id", "src")]);
    let ours = visible(&dom, "div", "#src", Some("custom"));

    let first = Oculus::new(dom.clone(), OculusConfig::strict()).unwrap();
    first.register(
        "custom",
        Handler::<FakeDom>::custom(|_, _| Ok(Binding::new())),
    );
    let second = Oculus::new(dom.clone(), OculusConfig::strict()).unwrap();

    assert!(second.scan().unwrap_err().is_handler_not_found());
    assert_eq!(first.scan().unwrap().bound, 1);
    assert!(dom.has_class(&ours, "js-oculus-setup"));
}

#[test]
fn replaced_target_is_rebound() {
    let dom = FakeDom::new();
    let old = dom.create_with("span", &[("id", "price")]);
    dom.set_character_data(old, "v1");
    let ours = visible(&dom, "div", "#price", Some("text"));
    let oculus = started(&dom, OculusConfig::default());
    assert_eq!(dom.text(&ours), "v1");

    // The page re-renders the canonical node.
    dom.detach(old);
    let new = dom.create_with("span", &[("id", "price")]);
    dom.set_character_data(new, "v2");
    dom.advance(50);

    assert_eq!(oculus.bound_count(), 1);
    assert!(dom.has_class(&ours, "js-oculus-setup"));
    assert_eq!(dom.text(&ours), "v2");

    dom.set_character_data(new, "v3");
    dom.flush_mutations();
    assert_eq!(dom.text(&ours), "v3");
}

#[test]
fn strict_tick_failure_is_not_retried() {
    use std::cell::Cell;
    use std::rc::Rc;

    let dom = FakeDom::new();
    dom.create_with("div", &[("id", "src")]);
    let oculus = started(&dom, OculusConfig::strict());

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    oculus.register(
        "side",
        Handler::<FakeDom>::custom(move |_, _| {
            counter.set(counter.get() + 1);
            Ok(Binding::new())
        }),
    );

    let failing = visible(&dom, "div", "#src", Some("side bogus"));
    let later = visible(&dom, "div", "#src", Some("side"));
    dom.advance(1000);

    // One failed attempt, then the later element binds.
    assert_eq!(calls.get(), 2);
    assert!(oculus.dispatcher().borrow().is_rejected(&failing));
    assert!(!dom.has_class(&failing, "js-oculus-setup"));
    assert!(dom.has_class(&later, "js-oculus-setup"));
    assert_eq!(oculus.bound_count(), 1);

    // Supplying the missing handler lets the next tick bind it.
    oculus.register("bogus", Handler::<FakeDom>::custom(|_, _| Ok(Binding::new())));
    dom.advance(50);
    assert_eq!(calls.get(), 3);
    assert_eq!(oculus.bound_count(), 2);
    assert!(!oculus.dispatcher().borrow().is_rejected(&failing));
}

#[test]
fn element_reference_links_through_generated_selector() {
    let dom = FakeDom::new();
    let theirs = dom.create("span");
    dom.set_character_data(theirs, "Sold out");
    let selector = oculus_core::selector_for_element(&dom, &theirs);
    let ours = visible(&dom, "div", &selector, Some("text"));

    let oculus = started(&dom, OculusConfig::default());
    assert_eq!(oculus.bound_count(), 1);
    assert_eq!(dom.text(&ours), "Sold out");
}
