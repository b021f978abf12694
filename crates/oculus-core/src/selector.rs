//! Selectors for elements a page holds by reference.
//!
//! The link attribute takes a selector, so an element without a usable id
//! gets a generated marker class and the selector for that class.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::MirrorHost;

/// Prefix of generated marker classes.
pub const ELEMENT_CLASS_PREFIX: &str = "js-oculus-id-";

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A selector matching `element`, tagging it with a marker class if needed.
///
/// An element tagged by an earlier call keeps its class, so the same
/// selector comes back. A generated class already present elsewhere in the
/// document is skipped.
pub fn selector_for_element<H: MirrorHost>(host: &H, element: &H::Element) -> String {
    if let Some(existing) = host.attribute(element, "class").and_then(|classes| {
        classes
            .split_whitespace()
            .find(|class| class.starts_with(ELEMENT_CLASS_PREFIX))
            .map(str::to_owned)
    }) {
        return format!(".{existing}");
    }

    loop {
        let id = NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed);
        let class = format!("{ELEMENT_CLASS_PREFIX}{id}");
        let selector = format!(".{class}");
        if host.query_all(&selector).is_empty() {
            host.add_class(element, &class);
            tracing::trace!(element = %host.describe(element), %selector, "tagged element");
            return selector;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::FakeDom;

    #[test]
    fn test_selector_matches_only_the_element() {
        let dom = FakeDom::new();
        let a = dom.create("div");
        let b = dom.create_with("div", &[("class", "card")]);

        let selector_a = selector_for_element(&dom, &a);
        let selector_b = selector_for_element(&dom, &b);
        assert_ne!(selector_a, selector_b);
        assert_eq!(dom.query_all(&selector_a), vec![a]);
        assert_eq!(dom.query_all(&selector_b), vec![b]);
        assert!(dom.has_class(&b, "card"));
    }

    #[test]
    fn test_selector_is_stable_per_element() {
        let dom = FakeDom::new();
        let a = dom.create("div");
        let first = selector_for_element(&dom, &a);
        assert_eq!(selector_for_element(&dom, &a), first);
        assert_eq!(dom.attribute(&a, "class").map(|c| c.split_whitespace().count()), Some(1));
    }

    #[test]
    fn test_taken_class_is_skipped() {
        let dom = FakeDom::new();
        let a = dom.create("div");
        let other = dom.create("div");
        // Predict the next generated class and hand it to another element.
        let next = NEXT_ELEMENT_ID.load(Ordering::Relaxed);
        for id in next..next + 4 {
            dom.add_class(&other, &format!("{ELEMENT_CLASS_PREFIX}{id}"));
        }

        let selector = selector_for_element(&dom, &a);
        assert_eq!(dom.query_all(&selector), vec![a]);
    }
}
