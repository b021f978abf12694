//! `value`: bidirectional value mirroring.
//!
//! Input-like elements (`input`, `textarea`):
//! - ours `keyup`/`change` writes ours' value (plus `disabled`, `readonly`
//!   and, for checkboxes and radios, `checked`) to every canonical node and
//!   fires `change` on them
//! - a canonical `change`, or a value difference seen by the poll, writes
//!   the canonical value to ours and fires `change` on ours
//!
//! Script writes to `.value` fire no event and are invisible to mutation
//! observers, hence the poll.
//!
//! Select elements mirror `selectedIndex` both ways on `change`.
//!
//! Both directions share one [`ChangeGuard`], so the `change` fired on the
//! other side does not bounce back.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::guard::ChangeGuard;
use crate::host::{DomEvent, ElementKind, Flag, MirrorHost};

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let kind = cx.host.kind(&pair.ours);
    if kind.is_input_like() {
        bind_input(cx, pair, kind)
    } else if kind == ElementKind::Select {
        bind_select(cx, pair)
    } else {
        tracing::debug!(
            ours = %cx.host.describe(&pair.ours),
            kind = ?kind,
            "value: element is neither input-like nor select, nothing to bind"
        );
        Ok(Binding::new())
    }
}

fn bind_input<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
    kind: ElementKind,
) -> Result<Binding<H>, OculusError> {
    let guard = ChangeGuard::new();
    // Last canonical value written or observed, compared against by the poll.
    let last_seen: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

    let ours_to_theirs: Rc<dyn Fn()> = {
        let host = cx.host.clone();
        let guard = guard.clone();
        let last_seen = last_seen.clone();
        let ours = pair.ours.clone();
        let theirs = pair.theirs().to_vec();
        Rc::new(move || {
            let Some(_propagation) = guard.enter() else {
                tracing::trace!("value: suppressed echo from canonical change");
                return;
            };
            let value = host.value(&ours);
            let disabled = host.flag(&ours, Flag::Disabled);
            let readonly = host.flag(&ours, Flag::ReadOnly);
            let checked = kind.is_toggle().then(|| host.flag(&ours, Flag::Checked));

            let targets: Vec<_> = theirs.iter().filter(|t| host.is_connected(t)).collect();
            for target in &targets {
                host.set_value(target, &value);
                host.set_flag(target, Flag::Disabled, disabled);
                host.set_flag(target, Flag::ReadOnly, readonly);
                if let Some(checked) = checked {
                    host.set_flag_attribute(target, Flag::Checked, checked);
                    host.set_flag(target, Flag::Checked, checked);
                }
            }
            *last_seen.borrow_mut() = Some(value);
            for target in targets {
                host.dispatch_change(target);
            }
        })
    };

    let theirs_to_ours: Rc<dyn Fn()> = {
        let host = cx.host.clone();
        let guard = guard.clone();
        let last_seen = last_seen.clone();
        let ours = pair.ours.clone();
        let primary = pair.primary().clone();
        Rc::new(move || {
            let Some(_propagation) = guard.enter() else {
                tracing::trace!("value: suppressed echo from visible change");
                return;
            };
            if !host.is_connected(&primary) {
                return;
            }
            let value = host.value(&primary);
            host.set_value(&ours, &value);
            *last_seen.borrow_mut() = Some(value);
            host.dispatch_change(&ours);
        })
    };

    let poll = {
        let host = cx.host.clone();
        let primary = pair.primary().clone();
        let theirs_to_ours = theirs_to_ours.clone();
        move || {
            if !host.is_connected(&primary) {
                return;
            }
            let current = host.value(&primary);
            let changed = last_seen.borrow().as_deref() != Some(current.as_str());
            if changed {
                theirs_to_ours();
            }
        }
    };

    let mut binding = Binding::new();
    for event in [DomEvent::KeyUp, DomEvent::Change] {
        let handler = ours_to_theirs.clone();
        binding.push(cx.host.listen(
            &pair.ours,
            event,
            Box::new(move |_: &H::Event| handler()),
        )?);
    }
    for target in pair.theirs() {
        let handler = theirs_to_ours.clone();
        binding.push(cx.host.listen(
            target,
            DomEvent::Change,
            Box::new(move |_: &H::Event| handler()),
        )?);
    }

    // First sample runs now, so ours starts from the canonical value.
    poll();
    binding.push(cx.host.every(cx.config.value_poll_ms, Box::new(poll)));
    Ok(binding)
}

fn bind_select<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let guard = ChangeGuard::new();
    let mut binding = Binding::new();

    let ours_to_theirs = {
        let host = cx.host.clone();
        let guard = guard.clone();
        let ours = pair.ours.clone();
        let theirs = pair.theirs().to_vec();
        move |_: &H::Event| {
            let Some(_propagation) = guard.enter() else {
                return;
            };
            let index = host.selected_index(&ours);
            for target in theirs.iter().filter(|t| host.is_connected(t)) {
                host.set_selected_index(target, index);
                host.dispatch_change(target);
            }
        }
    };
    binding.push(
        cx.host
            .listen(&pair.ours, DomEvent::Change, Box::new(ours_to_theirs))?,
    );

    for target in pair.theirs() {
        let host = cx.host.clone();
        let guard = guard.clone();
        let ours = pair.ours.clone();
        let source = target.clone();
        binding.push(cx.host.listen(
            target,
            DomEvent::Change,
            Box::new(move |_: &H::Event| {
                let Some(_propagation) = guard.enter() else {
                    return;
                };
                host.set_selected_index(&ours, host.selected_index(&source));
                host.dispatch_change(&ours);
            }),
        )?);
    }

    Ok(binding)
}
