//! `click`: forward clicks on ours to the canonical element(s).
//!
//! The synthetic click copies coordinates, modifier keys, button and the
//! source's `bubbles`/`cancelable` flags. The host forwards suppression
//! calls made on the synthetic event to the original one, so a canonical
//! handler that cancels the click also cancels it on the visible element.

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::{DomEvent, MirrorHost};

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let host = cx.host.clone();
    let theirs = pair.theirs().to_vec();

    let listener = cx.host.listen(
        &pair.ours,
        DomEvent::Click,
        Box::new(move |event: &H::Event| {
            let init = host.click_init(event);
            for target in &theirs {
                if !host.is_connected(target) {
                    tracing::trace!(target = %host.describe(target), "click: target detached, skipping");
                    continue;
                }
                if let Err(e) = host.dispatch_click(target, &init, event) {
                    tracing::warn!(target = %host.describe(target), "click forwarding failed: {e}");
                }
            }
        }),
    )?;
    Ok(Binding::from(vec![listener]))
}
