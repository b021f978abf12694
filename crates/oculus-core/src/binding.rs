//! Element pairs and the subscriptions bound to them.

use std::fmt;

use crate::config::OculusConfig;
use crate::host::MirrorHost;

/// A visible element and the canonical node(s) it mirrors.
///
/// `theirs` is never empty. Reads come from the first node; writes go to
/// every node.
pub struct Pair<H: MirrorHost> {
    pub ours: H::Element,
    theirs: Vec<H::Element>,
}

impl<H: MirrorHost> Pair<H> {
    /// Build a pair, or `None` if the link resolved to no nodes.
    pub fn new(ours: H::Element, theirs: Vec<H::Element>) -> Option<Self> {
        if theirs.is_empty() {
            return None;
        }
        Some(Self { ours, theirs })
    }

    /// The node reads come from.
    pub fn primary(&self) -> &H::Element {
        &self.theirs[0]
    }

    pub fn theirs(&self) -> &[H::Element] {
        &self.theirs
    }
}

impl<H: MirrorHost> Clone for Pair<H> {
    fn clone(&self) -> Self {
        Self {
            ours: self.ours.clone(),
            theirs: self.theirs.clone(),
        }
    }
}

impl<H: MirrorHost> fmt::Debug for Pair<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("ours", &self.ours)
            .field("theirs", &self.theirs)
            .finish()
    }
}

/// What a strategy gets to work with while binding.
pub struct BindContext<'a, H: MirrorHost> {
    pub host: &'a H,
    pub config: &'a OculusConfig,
}

/// Subscriptions installed for one pair.
///
/// Dropping the binding releases every listener, observer and timer in it.
pub struct Binding<H: MirrorHost> {
    subscriptions: Vec<H::Subscription>,
}

impl<H: MirrorHost> Binding<H> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub fn push(&mut self, subscription: H::Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn extend(&mut self, other: Binding<H>) {
        self.subscriptions.extend(other.subscriptions);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<H: MirrorHost> Default for Binding<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MirrorHost> From<Vec<H::Subscription>> for Binding<H> {
    fn from(subscriptions: Vec<H::Subscription>) -> Self {
        Self { subscriptions }
    }
}

impl<H: MirrorHost> fmt::Debug for Binding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
