//! `html`: mirror the canonical element's inner markup.
//!
//! Markup is copied only when it differs from the last copied snapshot, so
//! unchanged content never resets focus or selection inside ours. Changes
//! are picked up by a content observer and by a poll.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::{MirrorHost, MutationFilter};

/// Handler argument that removes inline styles from copied markup.
pub const STRIP_STYLE: &str = "strip-style";

/// Arguments read from the handler-arguments attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlArgs {
    pub strip_style: bool,
}

impl HtmlArgs {
    pub fn parse(raw: &str) -> Self {
        Self {
            strip_style: raw.split_whitespace().any(|token| token == STRIP_STYLE),
        }
    }
}

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let args = cx
        .host
        .attribute(&pair.ours, &cx.config.handler_args_attribute)
        .map(|raw| HtmlArgs::parse(&raw))
        .unwrap_or_default();

    let snapshot = Rc::new(RefCell::new(cx.host.inner_html(&pair.ours)));
    let update: Rc<dyn Fn()> = {
        let host = cx.host.clone();
        let ours = pair.ours.clone();
        let theirs = pair.primary().clone();
        Rc::new(move || {
            if !host.is_connected(&theirs) {
                return;
            }
            let markup = host.inner_html(&theirs);
            if *snapshot.borrow() == markup {
                return;
            }
            host.set_inner_html(&ours, &markup);
            if args.strip_style {
                host.strip_descendant_styles(&ours);
            }
            *snapshot.borrow_mut() = markup;
        })
    };
    update();

    let on_mutation = update.clone();
    let observer = cx.host.observe(
        pair.primary(),
        MutationFilter::CONTENT,
        Box::new(move || on_mutation()),
    )?;
    let poll = cx
        .host
        .every(cx.config.html_poll_ms, Box::new(move || update()));
    Ok(Binding::from(vec![observer, poll]))
}
