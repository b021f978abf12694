//! oculus-core: element mirroring without a DOM dependency.
//!
//! A page renders each form control twice: a canonical element the
//! application reads, and a visible one laid out for the current viewport.
//! This crate keeps the visible element in sync with the canonical one.
//!
//! This crate provides:
//! - `MirrorHost` trait for the DOM operations mirroring needs
//! - `HandlerRegistry` - named strategies, seven built in
//! - `Dispatcher` - finds linked elements and binds their strategies
//! - `Oculus` - a dispatcher plus its periodic re-scan
//! - `selector_for_element` - a link selector for an element held by reference
//! - `testkit::FakeDom` - in-memory host (`testkit` feature)

pub mod binding;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod host;
pub mod registry;
pub mod selector;
pub mod strategy;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use binding::{BindContext, Binding, Pair};
pub use config::{FailurePolicy, OculusConfig};
pub use dispatcher::{BindOutcome, Discovery, Dispatcher, Oculus, ScanReport};
pub use error::OculusError;
pub use guard::{ChangeGuard, GuardState, Propagation};
pub use host::{
    ClickInit, DomEvent, ElementKind, EventControl, Flag, MirrorHost, MutationFilter,
    PlatformError,
};
pub use registry::{CustomHandler, Handler, HandlerRegistry};
pub use selector::{ELEMENT_CLASS_PREFIX, selector_for_element};
pub use smol_str::SmolStr;
pub use strategy::{BuiltinStrategy, UnknownStrategy};
