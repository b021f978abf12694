//! `state`: copy boolean form state from the canonical element to ours.
//!
//! `checked` is written both as property and as attribute: once a
//! checkbox's property has been touched, the attribute no longer drives it.

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::{ElementKind, Flag, MirrorHost, MutationFilter};

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let ours_kind = cx.host.kind(&pair.ours);
    let theirs_kind = cx.host.kind(pair.primary());

    if ours_kind == ElementKind::Select {
        cx.host
            .set_inner_html(&pair.ours, &cx.host.inner_html(pair.primary()));
    }
    if theirs_kind == ElementKind::HiddenInput {
        cx.host.set_display(&pair.ours, "none");
    }

    let host = cx.host.clone();
    let ours = pair.ours.clone();
    let theirs = pair.primary().clone();
    let mut update = move || {
        if !host.is_connected(&theirs) {
            return;
        }
        host.set_flag(&ours, Flag::Disabled, host.flag(&theirs, Flag::Disabled));
        host.set_flag(&ours, Flag::ReadOnly, host.flag(&theirs, Flag::ReadOnly));

        if theirs_kind == ElementKind::Option {
            host.set_flag(&ours, Flag::Selected, host.flag(&theirs, Flag::Selected));
        }

        if theirs_kind.is_toggle() {
            let checked = host.flag(&theirs, Flag::Checked);
            host.set_flag_attribute(&ours, Flag::Checked, checked);
            host.set_flag(&ours, Flag::Checked, checked);
        }
    };
    update();

    let observer = cx
        .host
        .observe(pair.primary(), MutationFilter::ATTRIBUTES, Box::new(update))?;
    Ok(Binding::from(vec![observer]))
}
