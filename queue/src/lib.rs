//! Redemption queue: the lifecycle of deferred redemption requests.
//!
//! A request is opened by an authorized processor (the vault or the reward
//! engine), becomes fulfillable once its window has elapsed, and ends either
//! fulfilled or cancelled:
//!
//! ```text
//! PENDING ──fulfill (now ≥ fulfillable_at)──▶ FULFILLED
//!    │
//!    └──────────cancel────────────────────▶ CANCELLED
//! ```
//!
//! The queue records state only. The processor that opened a request holds
//! the funds it refers to and moves them in the same call as the transition.

pub mod config;
pub mod error;
pub mod queue;
pub mod request;

pub use config::QueueConfig;
pub use error::QueueError;
pub use queue::{derive_request_id, QueueStatus, RedemptionQueue};
pub use request::RedemptionRequest;
