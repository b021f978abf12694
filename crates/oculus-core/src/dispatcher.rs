//! Pair discovery, binding and the periodic re-scan.
//!
//! A candidate is any element carrying the link attribute that has not yet
//! been marked with the setup class. Binding a candidate resolves its link
//! selector, picks the handler names and invokes each through the registry.
//! Candidates whose link resolves to nothing stay unmarked and are retried
//! on the next scan. A pair whose canonical node leaves the document is
//! released and its visible element unmarked, so a re-rendered target is
//! picked up again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::vec;

use serde::Serialize;
use smol_str::SmolStr;

use crate::binding::{BindContext, Binding, Pair};
use crate::config::{FailurePolicy, OculusConfig};
use crate::error::OculusError;
use crate::host::MirrorHost;
use crate::registry::{Handler, HandlerRegistry};
use crate::strategy::BuiltinStrategy;

/// Counts from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Candidates bound and marked.
    pub bound: usize,
    /// Candidates whose link resolved to no nodes.
    pub unresolved: usize,
    /// Handlers that failed to bind under the `log` policy.
    pub failed: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.bound == 0 && self.unresolved == 0 && self.failed == 0
    }
}

/// Result of binding a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The pair was bound. `failed` handlers were logged and skipped.
    Bound { handlers: usize, failed: usize },
    /// The link was empty or matched nothing. The element was left unmarked.
    Unresolved,
    /// The element already has a live binding in this dispatcher.
    AlreadyBound,
}

/// A bound pair and everything installed for it.
struct BoundPair<H: MirrorHost> {
    pair: Pair<H>,
    handlers: Vec<SmolStr>,
    // Held for its Drop.
    _binding: Binding<H>,
}

/// Lazy iterator over unmarked candidates.
///
/// The candidate list is queried when the iterator is created; the setup
/// class is checked as each element is reached, so elements bound earlier
/// in the same pass are skipped.
pub struct Discovery<H: MirrorHost> {
    host: H,
    setup_class: String,
    candidates: vec::IntoIter<H::Element>,
}

impl<H: MirrorHost> Iterator for Discovery<H> {
    type Item = H::Element;

    fn next(&mut self) -> Option<Self::Item> {
        let host = &self.host;
        let setup_class = self.setup_class.as_str();
        self.candidates
            .by_ref()
            .find(|element| !host.has_class(element, setup_class))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.candidates.size_hint().1)
    }
}

/// Discovers pairs in a document and binds them.
pub struct Dispatcher<H: MirrorHost> {
    host: H,
    config: OculusConfig,
    registry: HandlerRegistry<H>,
    pairs: Vec<BoundPair<H>>,
    /// Candidates that failed under the `strict` policy. Scans skip them
    /// until the registry changes.
    rejected: Vec<H::Element>,
}

impl<H: MirrorHost> Dispatcher<H> {
    /// Create a dispatcher with the built-in strategies registered and the
    /// default handler taken from `config`.
    pub fn new(host: H, config: OculusConfig) -> Result<Self, OculusError> {
        config.validate()?;
        let mut registry = HandlerRegistry::with_builtins();
        registry.set_default(config.default_handler.as_deref());
        Ok(Self {
            host,
            config,
            registry,
            pairs: Vec::new(),
            rejected: Vec::new(),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &OculusConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry<H> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry<H> {
        &mut self.registry
    }

    /// Register a handler. Already-bound pairs keep the handler they got;
    /// candidates rejected under the `strict` policy are retried.
    pub fn register(&mut self, name: impl Into<SmolStr>, handler: Handler<H>) -> Option<Handler<H>> {
        self.rejected.clear();
        self.registry.register(name, handler)
    }

    pub fn set_default_handler(&mut self, name: Option<&str>) {
        self.rejected.clear();
        self.registry.set_default(name);
    }

    /// Candidates not yet marked as set up, in document order.
    pub fn discover(&self) -> Discovery<H> {
        let candidates = self.host.query_all(&self.config.link_selector());
        Discovery {
            host: self.host.clone(),
            setup_class: self.config.setup_class.clone(),
            candidates: candidates.into_iter(),
        }
    }

    /// Bind every current candidate.
    ///
    /// Under the `strict` policy the first handler failure aborts the scan.
    /// Pairs bound before the failure stay bound; the failing candidate is
    /// left unmarked and skipped by later scans until a handler is
    /// registered or the default changes.
    pub fn scan(&mut self) -> Result<ScanReport, OculusError> {
        let mut report = ScanReport::default();
        for ours in self.discover() {
            if self.is_rejected(&ours) {
                continue;
            }
            match self.bind(&ours)? {
                BindOutcome::Bound { failed, .. } => {
                    report.bound += 1;
                    report.failed += failed;
                }
                BindOutcome::Unresolved => report.unresolved += 1,
                BindOutcome::AlreadyBound => {}
            }
        }
        if !report.is_empty() {
            tracing::debug!(
                bound = report.bound,
                unresolved = report.unresolved,
                failed = report.failed,
                "scan complete"
            );
        }
        Ok(report)
    }

    /// Bind one element, whether or not it carries the setup class.
    pub fn bind(&mut self, ours: &H::Element) -> Result<BindOutcome, OculusError> {
        if self.is_bound(ours) {
            return Ok(BindOutcome::AlreadyBound);
        }

        let Some(pair) = self.resolve(ours) else {
            tracing::trace!(ours = %self.host.describe(ours), "link target not found");
            return Ok(BindOutcome::Unresolved);
        };
        self.bind_pair(pair)
    }

    /// Bind `ours` to nodes the caller already holds, bypassing the link
    /// attribute. An empty `theirs` is `Unresolved`.
    pub fn link(
        &mut self,
        ours: &H::Element,
        theirs: Vec<H::Element>,
    ) -> Result<BindOutcome, OculusError> {
        if self.is_bound(ours) {
            return Ok(BindOutcome::AlreadyBound);
        }
        match Pair::new(ours.clone(), theirs) {
            Some(pair) => self.bind_pair(pair),
            None => Ok(BindOutcome::Unresolved),
        }
    }

    fn bind_pair(&mut self, pair: Pair<H>) -> Result<BindOutcome, OculusError> {
        let ours = &pair.ours;
        let handlers = self.handler_names_for(ours);
        let cx = BindContext {
            host: &self.host,
            config: &self.config,
        };
        let mut binding = Binding::new();
        let mut failed = 0;
        for name in &handlers {
            match self.registry.invoke(name, &cx, &pair) {
                Ok(installed) => binding.extend(installed),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Strict => {
                        if !self.is_rejected(ours) {
                            self.rejected.push(ours.clone());
                        }
                        return Err(err);
                    }
                    FailurePolicy::Log => {
                        tracing::error!(handler = %name, error = %err, "failed to bind handler");
                        failed += 1;
                    }
                },
            }
        }

        self.rejected.retain(|rejected| rejected != ours);
        self.host.add_class(ours, &self.config.setup_class);
        tracing::debug!(
            ours = %self.host.describe(ours),
            theirs = pair.theirs().len(),
            handlers = ?handlers,
            "bound pair"
        );
        let outcome = BindOutcome::Bound {
            handlers: handlers.len() - failed,
            failed,
        };
        self.pairs.push(BoundPair {
            pair,
            handlers,
            _binding: binding,
        });
        Ok(outcome)
    }

    /// Resolve the link attribute of `ours` to a pair.
    fn resolve(&self, ours: &H::Element) -> Option<Pair<H>> {
        let selector = self.host.attribute(ours, &self.config.link_attribute)?;
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        Pair::new(ours.clone(), self.host.query_all(selector))
    }

    /// Handler names for `ours`, in bind order.
    ///
    /// An explicit list wins. Without one, `input` and `select` elements get
    /// `value` and everything else gets the default handler. With no default
    /// nothing is bound.
    pub fn handler_names_for(&self, ours: &H::Element) -> Vec<SmolStr> {
        if let Some(list) = self.host.attribute(ours, &self.config.handlers_attribute) {
            let names: Vec<SmolStr> = list.split_whitespace().map(SmolStr::new).collect();
            if !names.is_empty() {
                return names;
            }
        }

        let Some(default) = self.registry.default_handler() else {
            return Vec::new();
        };
        match self.host.tag_name(ours).as_str() {
            "input" | "select" => vec![SmolStr::new(BuiltinStrategy::Value.name())],
            _ => vec![SmolStr::new(default)],
        }
    }

    /// Release the subscriptions of one pair.
    ///
    /// The element keeps its setup class, so scans do not bind it again.
    pub fn unbind(&mut self, ours: &H::Element) -> bool {
        let Some(index) = self.pairs.iter().position(|bound| bound.pair.ours == *ours) else {
            return false;
        };
        let bound = self.pairs.remove(index);
        tracing::debug!(
            ours = %self.host.describe(ours),
            handlers = ?bound.handlers,
            "unbound pair"
        );
        true
    }

    /// Unbind every pair whose visible element or primary canonical node
    /// has left the document. Returns the number of pairs released.
    ///
    /// A visible element still in the document loses its setup class, so
    /// the next scan resolves its link again.
    pub fn prune_detached(&mut self) -> usize {
        let Self {
            host,
            config,
            pairs,
            rejected,
            ..
        } = self;
        let before = pairs.len();
        pairs.retain(|bound| {
            let ours_connected = host.is_connected(&bound.pair.ours);
            if ours_connected && host.is_connected(bound.pair.primary()) {
                return true;
            }
            if ours_connected {
                host.remove_class(&bound.pair.ours, &config.setup_class);
            }
            false
        });
        rejected.retain(|element| host.is_connected(element));
        let pruned = before - pairs.len();
        if pruned > 0 {
            tracing::debug!(pruned, "released detached pairs");
        }
        pruned
    }

    pub fn bound_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_bound(&self, ours: &H::Element) -> bool {
        self.pairs.iter().any(|bound| bound.pair.ours == *ours)
    }

    /// Whether scans skip `ours` after a `strict` failure.
    pub fn is_rejected(&self, ours: &H::Element) -> bool {
        self.rejected.contains(ours)
    }

    /// Handler names a bound element was set up with.
    pub fn handlers_of(&self, ours: &H::Element) -> Option<&[SmolStr]> {
        self.pairs
            .iter()
            .find(|bound| bound.pair.ours == *ours)
            .map(|bound| bound.handlers.as_slice())
    }
}

impl<H: MirrorHost> fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("bound", &self.pairs.len())
            .finish()
    }
}

/// A dispatcher plus its re-scan timer.
///
/// Each tick prunes detached pairs and then scans. Scan errors on a tick
/// are logged, since there is no caller to return them to. Dropping the
/// runner stops the timer and releases every binding.
pub struct Oculus<H: MirrorHost> {
    dispatcher: Rc<RefCell<Dispatcher<H>>>,
    ticker: Option<H::Subscription>,
}

impl<H: MirrorHost> Oculus<H> {
    pub fn new(host: H, config: OculusConfig) -> Result<Self, OculusError> {
        Ok(Self::from_dispatcher(Dispatcher::new(host, config)?))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher<H>) -> Self {
        Self {
            dispatcher: Rc::new(RefCell::new(dispatcher)),
            ticker: None,
        }
    }

    /// Shared handle to the dispatcher.
    ///
    /// Borrowing it from inside a strategy callback while a scan runs will
    /// fail; use `try_borrow_mut` there.
    pub fn dispatcher(&self) -> &Rc<RefCell<Dispatcher<H>>> {
        &self.dispatcher
    }

    pub fn register(&self, name: impl Into<SmolStr>, handler: Handler<H>) -> Option<Handler<H>> {
        self.dispatcher.borrow_mut().register(name, handler)
    }

    pub fn set_default_handler(&self, name: Option<&str>) {
        self.dispatcher.borrow_mut().set_default_handler(name);
    }

    pub fn scan(&self) -> Result<ScanReport, OculusError> {
        self.dispatcher.borrow_mut().scan()
    }

    pub fn unbind(&self, ours: &H::Element) -> bool {
        self.dispatcher.borrow_mut().unbind(ours)
    }

    pub fn bound_count(&self) -> usize {
        self.dispatcher.borrow().bound_count()
    }

    /// Scan once, then keep scanning every `scan_interval_ms`.
    ///
    /// The first scan's error is returned and the timer is not started.
    /// Calling `start` on a running instance only scans.
    pub fn start(&mut self) -> Result<ScanReport, OculusError> {
        let report = self.scan()?;
        if self.ticker.is_some() {
            return Ok(report);
        }

        let (host, period) = {
            let dispatcher = self.dispatcher.borrow();
            (dispatcher.host().clone(), dispatcher.config().scan_interval_ms)
        };
        let weak = Rc::downgrade(&self.dispatcher);
        let ticker = host.every(
            period,
            Box::new(move || {
                let Some(cell) = weak.upgrade() else {
                    return;
                };
                let Ok(mut dispatcher) = cell.try_borrow_mut() else {
                    tracing::trace!("dispatcher busy, skipping tick");
                    return;
                };
                dispatcher.prune_detached();
                if let Err(err) = dispatcher.scan() {
                    tracing::error!(error = %err, "periodic scan failed");
                }
            }),
        );
        tracing::info!(period_ms = period, "oculus started");
        self.ticker = Some(ticker);
        Ok(report)
    }

    /// Cancel the re-scan timer. Existing bindings stay live.
    pub fn stop(&mut self) -> bool {
        let was_running = self.ticker.take().is_some();
        if was_running {
            tracing::info!("oculus stopped");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }
}

impl<H: MirrorHost> fmt::Debug for Oculus<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oculus")
            .field("dispatcher", &self.dispatcher)
            .field("running", &self.ticker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FakeDom, NodeId};

    fn linked(dom: &FakeDom, tag: &str, link: &str, handlers: Option<&str>) -> NodeId {
        let ours = dom.create_with(tag, &[("data-oculus-element", link)]);
        if let Some(handlers) = handlers {
            dom.set_attribute(ours, "data-oculus-handlers", handlers);
        }
        ours
    }

    fn names(names: Vec<SmolStr>) -> Vec<String> {
        names.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = OculusConfig {
            scan_interval_ms: 0,
            ..OculusConfig::default()
        };
        let err = Dispatcher::new(FakeDom::new(), config).unwrap_err();
        assert!(matches!(err, OculusError::InvalidConfig(_)));
    }

    #[test]
    fn test_discover_skips_marked() {
        let dom = FakeDom::new();
        let a = linked(&dom, "div", "#x", None);
        let b = linked(&dom, "div", "#x", None);
        dom.create("div");
        dom.set_attribute(a, "class", "js-oculus-setup");

        let dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        assert_eq!(dispatcher.discover().collect::<Vec<_>>(), vec![b]);
        // Restartable.
        assert_eq!(dispatcher.discover().count(), 1);
    }

    #[test]
    fn test_handler_names() {
        let dom = FakeDom::new();
        let listed = linked(&dom, "div", "#x", Some("  value   state value "));
        let blank = linked(&dom, "div", "#x", Some("   "));
        let input = linked(&dom, "input", "#x", None);
        let select = linked(&dom, "select", "#x", None);

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        assert_eq!(names(dispatcher.handler_names_for(&listed)), ["value", "state", "value"]);
        assert_eq!(names(dispatcher.handler_names_for(&blank)), ["click"]);
        assert_eq!(names(dispatcher.handler_names_for(&input)), ["value"]);
        assert_eq!(names(dispatcher.handler_names_for(&select)), ["value"]);

        dispatcher.set_default_handler(None);
        assert!(dispatcher.handler_names_for(&blank).is_empty());
        assert!(dispatcher.handler_names_for(&select).is_empty());
        assert_eq!(dispatcher.handler_names_for(&listed).len(), 3);
    }

    #[test]
    fn test_unresolved_is_retried() {
        let dom = FakeDom::new();
        let ours = linked(&dom, "div", "#later", Some("text"));
        let empty = linked(&dom, "div", "  ", None);

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        let report = dispatcher.scan().unwrap();
        assert_eq!(report.unresolved, 2);
        assert_eq!(report.bound, 0);
        assert!(!dom.has_class(&ours, "js-oculus-setup"));

        dom.create_with("span", &[("id", "later")]);
        let report = dispatcher.scan().unwrap();
        assert_eq!(report.bound, 1);
        assert_eq!(report.unresolved, 1);
        assert!(dispatcher.is_bound(&ours));
        assert!(!dispatcher.is_bound(&empty));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("text"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        assert_eq!(dispatcher.scan().unwrap().bound, 1);
        let observers = dom.observer_count();
        assert!(dispatcher.scan().unwrap().is_empty());
        assert_eq!(dom.observer_count(), observers);
        assert_eq!(dispatcher.bind(&ours).unwrap(), BindOutcome::AlreadyBound);
    }

    #[test]
    fn test_no_handlers_still_marks() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", None);
        let config = OculusConfig {
            default_handler: None,
            ..OculusConfig::default()
        };

        let mut dispatcher = Dispatcher::new(dom.clone(), config).unwrap();
        let outcome = dispatcher.bind(&ours).unwrap();
        assert_eq!(outcome, BindOutcome::Bound { handlers: 0, failed: 0 });
        assert!(dom.has_class(&ours, "js-oculus-setup"));
    }

    #[test]
    fn test_log_policy_continues() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("bogus text"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        let report = dispatcher.scan().unwrap();
        assert_eq!(report.bound, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(dom.observer_count(), 1);
        assert!(dom.has_class(&ours, "js-oculus-setup"));
    }

    #[test]
    fn test_strict_policy_aborts() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("text bogus"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::strict()).unwrap();
        let err = dispatcher.scan().unwrap_err();
        assert!(err.is_handler_not_found());
        // The text observer installed before the failure was released.
        assert_eq!(dom.observer_count(), 0);
        assert!(!dom.has_class(&ours, "js-oculus-setup"));
        assert_eq!(dispatcher.bound_count(), 0);
    }

    #[test]
    fn test_unbind_and_prune() {
        let dom = FakeDom::new();
        let src = dom.create_with("span", &[("id", "src")]);
        let a = linked(&dom, "div", "#src", Some("text"));
        let b = linked(&dom, "div", "#src", Some("visibility"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        dispatcher.scan().unwrap();
        assert_eq!(dispatcher.bound_count(), 2);
        assert_eq!(dom.observer_count(), 2);

        assert!(dispatcher.unbind(&a));
        assert!(!dispatcher.unbind(&a));
        assert_eq!(dom.observer_count(), 1);
        // Still marked, so not rebound.
        assert!(dispatcher.scan().unwrap().is_empty());

        assert_eq!(dispatcher.prune_detached(), 0);
        dom.detach(src);
        assert_eq!(dispatcher.prune_detached(), 1);
        assert!(!dispatcher.is_bound(&b));
        assert_eq!(dom.observer_count(), 0);
        // `b` is still on the page, so it becomes a candidate again.
        assert!(!dom.has_class(&b, "js-oculus-setup"));
        assert!(dom.has_class(&a, "js-oculus-setup"));
        assert_eq!(dispatcher.discover().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_prune_detached_ours_stays_marked() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("text"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        dispatcher.scan().unwrap();
        dom.detach(ours);
        assert_eq!(dispatcher.prune_detached(), 1);
        assert!(dom.has_class(&ours, "js-oculus-setup"));
    }

    #[test]
    fn test_strict_failure_skipped_until_registry_changes() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let failing = linked(&dom, "div", "#src", Some("text bogus"));
        let later = linked(&dom, "div", "#src", Some("text"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::strict()).unwrap();
        assert!(dispatcher.scan().is_err());
        assert!(dispatcher.is_rejected(&failing));
        assert!(!dispatcher.is_bound(&later));

        let report = dispatcher.scan().unwrap();
        assert_eq!(report.bound, 1);
        assert!(dispatcher.is_bound(&later));
        assert!(dispatcher.scan().unwrap().is_empty());

        dispatcher.register("bogus", Handler::<FakeDom>::custom(|_, _| Ok(Binding::new())));
        assert!(!dispatcher.is_rejected(&failing));
        assert_eq!(dispatcher.scan().unwrap().bound, 1);
        assert!(dispatcher.is_bound(&failing));
    }

    #[test]
    fn test_explicit_bind_retries_rejected() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("bogus"));

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::strict()).unwrap();
        assert!(dispatcher.scan().is_err());
        assert!(dispatcher.bind(&ours).is_err());
        assert!(dispatcher.is_rejected(&ours));

        dom.set_attribute(ours, "data-oculus-handlers", "text");
        assert_eq!(
            dispatcher.bind(&ours).unwrap(),
            BindOutcome::Bound { handlers: 1, failed: 0 }
        );
        assert!(!dispatcher.is_rejected(&ours));
    }

    #[test]
    fn test_link_binds_held_elements() {
        let dom = FakeDom::new();
        let theirs = dom.create("span");
        dom.set_character_data(theirs, "In stock");
        let ours = dom.create_with("div", &[("data-oculus-handlers", "text")]);

        let mut dispatcher = Dispatcher::new(dom.clone(), OculusConfig::default()).unwrap();
        assert_eq!(dispatcher.link(&ours, Vec::new()).unwrap(), BindOutcome::Unresolved);
        assert_eq!(
            dispatcher.link(&ours, vec![theirs]).unwrap(),
            BindOutcome::Bound { handlers: 1, failed: 0 }
        );
        assert_eq!(dom.text(&ours), "In stock");
        assert!(dom.has_class(&ours, "js-oculus-setup"));
        assert_eq!(dispatcher.link(&ours, vec![theirs]).unwrap(), BindOutcome::AlreadyBound);
    }

    #[test]
    fn test_runner_rescans_on_interval() {
        let dom = FakeDom::new();
        let mut oculus = Oculus::new(dom.clone(), OculusConfig::default()).unwrap();
        assert!(oculus.start().unwrap().is_empty());
        assert!(oculus.is_running());
        assert_eq!(dom.timer_count(), 1);

        dom.create_with("span", &[("id", "src")]);
        let ours = linked(&dom, "div", "#src", Some("text"));
        dom.advance(49);
        assert_eq!(oculus.bound_count(), 0);
        dom.advance(1);
        assert_eq!(oculus.bound_count(), 1);
        assert_eq!(oculus.dispatcher().borrow().handlers_of(&ours).map(<[_]>::len), Some(1));

        assert!(oculus.stop());
        assert!(!oculus.stop());
        assert_eq!(dom.timer_count(), 0);
    }

    #[test]
    fn test_runner_drop_releases_everything() {
        let dom = FakeDom::new();
        dom.create_with("span", &[("id", "src")]);
        linked(&dom, "div", "#src", Some("text html"));

        let mut oculus = Oculus::new(dom.clone(), OculusConfig::default()).unwrap();
        oculus.start().unwrap();
        assert!(dom.observer_count() > 0);
        drop(oculus);
        assert_eq!(dom.listener_count() + dom.observer_count() + dom.timer_count(), 0);
    }
}
