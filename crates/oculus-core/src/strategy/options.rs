//! `options`: copy the canonical element's markup once, at bind time.

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::MirrorHost;

pub fn bind<H: MirrorHost>(
    cx: &BindContext<'_, H>,
    pair: &Pair<H>,
) -> Result<Binding<H>, OculusError> {
    let theirs = pair.primary();
    if cx.host.is_connected(theirs) {
        cx.host
            .set_inner_html(&pair.ours, &cx.host.inner_html(theirs));
    }
    Ok(Binding::new())
}
