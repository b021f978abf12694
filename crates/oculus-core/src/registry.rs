//! Handler registry: strategy name to strategy.
//!
//! Each dispatcher owns one registry. The seven built-ins are registered up
//! front; pages can add their own handlers under new names or replace a
//! built-in by registering under its name.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::binding::{BindContext, Binding, Pair};
use crate::error::OculusError;
use crate::host::MirrorHost;
use crate::strategy::BuiltinStrategy;

/// Bind function of an externally registered handler.
pub type CustomHandler<H> =
    Rc<dyn Fn(&BindContext<'_, H>, &Pair<H>) -> Result<Binding<H>, OculusError>>;

/// A registered strategy.
pub enum Handler<H: MirrorHost> {
    Builtin(BuiltinStrategy),
    Custom(CustomHandler<H>),
}

impl<H: MirrorHost> Handler<H> {
    /// Wrap a closure as a custom handler.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&BindContext<'_, H>, &Pair<H>) -> Result<Binding<H>, OculusError> + 'static,
    {
        Handler::Custom(Rc::new(f))
    }

    pub fn bind(&self, cx: &BindContext<'_, H>, pair: &Pair<H>) -> Result<Binding<H>, OculusError> {
        match self {
            Handler::Builtin(strategy) => strategy.bind(cx, pair),
            Handler::Custom(f) => f(cx, pair),
        }
    }
}

impl<H: MirrorHost> Clone for Handler<H> {
    fn clone(&self) -> Self {
        match self {
            Handler::Builtin(strategy) => Handler::Builtin(*strategy),
            Handler::Custom(f) => Handler::Custom(f.clone()),
        }
    }
}

impl<H: MirrorHost> fmt::Debug for Handler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Builtin(strategy) => f.debug_tuple("Builtin").field(strategy).finish(),
            Handler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Named strategies plus the optional default.
pub struct HandlerRegistry<H: MirrorHost> {
    handlers: HashMap<SmolStr, Handler<H>>,
    default_handler: Option<SmolStr>,
}

impl<H: MirrorHost> HandlerRegistry<H> {
    /// Empty registry with no default.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default_handler: None,
        }
    }

    /// Registry holding every built-in strategy, with no default.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for strategy in BuiltinStrategy::ALL {
            registry.register(strategy.name(), Handler::Builtin(strategy));
        }
        registry
    }

    /// Store `handler` under `name`, returning the handler it replaced.
    pub fn register(&mut self, name: impl Into<SmolStr>, handler: Handler<H>) -> Option<Handler<H>> {
        let name = name.into();
        let previous = self.handlers.insert(name.clone(), handler);
        if previous.is_some() {
            tracing::debug!(handler = %name, "replaced registered handler");
        }
        previous
    }

    /// Set or clear the fallback strategy name.
    ///
    /// The name is resolved at bind time, so it may be registered later.
    pub fn set_default(&mut self, name: Option<&str>) {
        self.default_handler = name.map(SmolStr::new);
    }

    pub fn default_handler(&self) -> Option<&str> {
        self.default_handler.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Handler<H>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(SmolStr::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up `name` and bind it to `pair`.
    pub fn invoke(
        &self,
        name: &str,
        cx: &BindContext<'_, H>,
        pair: &Pair<H>,
    ) -> Result<Binding<H>, OculusError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| OculusError::HandlerNotFound {
                name: SmolStr::new(name),
                element: cx.host.describe(&pair.ours),
            })?;
        handler.bind(cx, pair)
    }
}

impl<H: MirrorHost> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MirrorHost> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .field("default_handler", &self.default_handler)
            .finish()
    }
}
