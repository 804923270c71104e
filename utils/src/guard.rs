//! Scoped re-entrancy guard.
//!
//! Every public mutator of a core component runs between `enter` and `exit`.
//! A nested call into any guarded entry point of the same component while the
//! outer call is still running is rejected with [`Reentered`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("re-entrant call rejected")]
pub struct Reentered;

/// An "in progress" flag held for the duration of a top-level call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReentrancyGuard {
    #[serde(skip)]
    entered: bool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) -> Result<(), Reentered> {
        if self.entered {
            return Err(Reentered);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}
