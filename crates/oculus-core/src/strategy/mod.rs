//! Built-in synchronization strategies.
//!
//! Each strategy binds one pair and knows nothing about the others:
//!
//! | strategy     | direction     | mechanism                              |
//! |--------------|---------------|----------------------------------------|
//! | `visibility` | theirs → ours | attribute observer, emits notification |
//! | `click`      | ours → theirs | click listener, synthetic click        |
//! | `text`       | theirs → ours | content observer                       |
//! | `value`      | both ways     | change/keyup listeners, value poll     |
//! | `state`      | theirs → ours | attribute observer                     |
//! | `html`       | theirs → ours | content observer and markup poll       |
//! | `options`    | one-shot      | markup copy at bind time               |

use std::fmt;
use std::str::FromStr;

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::MirrorHost;

pub mod click;
pub mod html;
pub mod options;
pub mod state;
pub mod text;
pub mod value;
pub mod visibility;

/// The closed set of strategies shipped with oculus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinStrategy {
    Visibility,
    Click,
    Text,
    Value,
    State,
    Html,
    Options,
}

impl BuiltinStrategy {
    pub const ALL: [BuiltinStrategy; 7] = [
        BuiltinStrategy::Visibility,
        BuiltinStrategy::Click,
        BuiltinStrategy::Text,
        BuiltinStrategy::Value,
        BuiltinStrategy::State,
        BuiltinStrategy::Html,
        BuiltinStrategy::Options,
    ];

    /// Name used in handler list attributes.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinStrategy::Visibility => "visibility",
            BuiltinStrategy::Click => "click",
            BuiltinStrategy::Text => "text",
            BuiltinStrategy::Value => "value",
            BuiltinStrategy::State => "state",
            BuiltinStrategy::Html => "html",
            BuiltinStrategy::Options => "options",
        }
    }

    /// Install this strategy on `pair`.
    pub fn bind<H: MirrorHost>(
        self,
        cx: &BindContext<'_, H>,
        pair: &Pair<H>,
    ) -> Result<Binding<H>, OculusError> {
        tracing::trace!(
            strategy = self.name(),
            ours = %cx.host.describe(&pair.ours),
            theirs = pair.theirs().len(),
            "binding strategy"
        );
        match self {
            BuiltinStrategy::Visibility => visibility::bind(cx, pair),
            BuiltinStrategy::Click => click::bind(cx, pair),
            BuiltinStrategy::Text => text::bind(cx, pair),
            BuiltinStrategy::Value => value::bind(cx, pair),
            BuiltinStrategy::State => state::bind(cx, pair),
            BuiltinStrategy::Html => html::bind(cx, pair),
            BuiltinStrategy::Options => options::bind(cx, pair),
        }
    }
}

impl fmt::Display for BuiltinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown built-in strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown built-in strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for BuiltinStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_owned()))
    }
}
