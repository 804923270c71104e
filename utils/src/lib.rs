//! Shared utilities for the Sova vault engine.

pub mod guard;
pub mod logging;
pub mod time;

pub use guard::{ReentrancyGuard, Reentered};
pub use logging::{init_logging, LogFormat};
pub use time::format_window;
