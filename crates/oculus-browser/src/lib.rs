//! Browser DOM host for oculus.
//!
//! Implements `oculus_core::MirrorHost` over `web-sys`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `host`: `BrowserHost`, the DOM operations the strategies run on
//! - `event`: event wrapper, synthetic clicks and suppression forwarding
//! - `subscription`: listener, observer and timer handles that unregister on drop
//!
//! # Re-exports
//!
//! This crate re-exports `oculus-core` for convenience, so consumers
//! only need to depend on `oculus-browser`.

// Re-export core crate
pub use oculus_core;
pub use oculus_core::*;

pub mod event;
pub mod host;
pub mod subscription;

pub use event::BrowserEvent;
pub use host::BrowserHost;
pub use subscription::{BrowserSubscription, ObserverHandle, Teardown};

/// Mirroring context running on the browser DOM.
pub type BrowserOculus = Oculus<BrowserHost>;
