//! Re-entrancy guard for bidirectional propagation.
//!
//! Writing a value to one side of a pair fires a `change` event there, which
//! would run the listener that writes back to the first side. The guard is a
//! two-state machine shared by both listeners of one pair:
//!
//! ```text
//! Idle --enter()--> Propagating --token dropped--> Idle
//! ```
//!
//! While `Propagating`, `enter()` returns `None` and the nested listener
//! returns without writing. Change events are dispatched synchronously, so
//! the nested call happens before the token drops and the suppression window
//! covers exactly one round-trip.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Idle,
    Propagating,
}

/// Per-pair change guard.
#[derive(Debug, Clone, Default)]
pub struct ChangeGuard {
    state: Rc<Cell<GuardState>>,
}

impl ChangeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    /// Start a propagation, or `None` if one is already running.
    pub fn enter(&self) -> Option<Propagation> {
        match self.state.get() {
            GuardState::Propagating => None,
            GuardState::Idle => {
                self.state.set(GuardState::Propagating);
                Some(Propagation {
                    state: self.state.clone(),
                })
            }
        }
    }
}

/// Token for a running propagation. Dropping it returns the guard to `Idle`.
#[must_use = "the guard returns to Idle as soon as the token is dropped"]
#[derive(Debug)]
pub struct Propagation {
    state: Rc<Cell<GuardState>>,
}

impl Drop for Propagation {
    fn drop(&mut self) {
        self.state.set(GuardState::Idle);
    }
}
