//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Mocks keep their state in memory and expose call counters so tests can
//! assert which ports were (or were not) touched.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
