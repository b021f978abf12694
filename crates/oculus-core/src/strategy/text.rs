//! `text`: copy the canonical element's text content to ours.

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::{MirrorHost, MutationFilter};

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let host = cx.host.clone();
    let ours = pair.ours.clone();
    let theirs = pair.primary().clone();

    let mut update = move || {
        if !host.is_connected(&theirs) {
            return;
        }
        host.set_text(&ours, &host.text(&theirs));
    };
    update();

    // Text lives in child text nodes, so the whole subtree is watched.
    let observer = cx
        .host
        .observe(pair.primary(), MutationFilter::CONTENT, Box::new(update))?;
    Ok(Binding::from(vec![observer]))
}
