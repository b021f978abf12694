//! `visibility`: copy the canonical element's computed `display` to ours.

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::{MirrorHost, MutationFilter};

/// Name of the notification emitted after each sync, without prefix.
pub const VISIBILITY_EVENT: &str = "visibility";

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let host = cx.host.clone();
    let ours = pair.ours.clone();
    let theirs = pair.primary().clone();
    let event = cx.config.event_name(VISIBILITY_EVENT);

    let mut update = move || {
        if !host.is_connected(&theirs) {
            return;
        }
        let display = host.computed_display(&theirs);
        host.set_display(&ours, &display);
        host.emit(&ours, &event, &theirs);
    };
    update();

    // Any attribute change can affect display (class, style, hidden).
    let observer = cx
        .host
        .observe(pair.primary(), MutationFilter::ATTRIBUTES, Box::new(update))?;
    Ok(Binding::from(vec![observer]))
}
