//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (the clock and fungible assets) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Can be told to fail, to exercise all-or-nothing behaviour
//!
//! Usage: swap real implementations for nullables in tests.

pub mod asset;
pub mod clock;

pub use asset::NullAsset;
pub use clock::NullClock;
