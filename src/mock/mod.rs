//! Scripted results for mocked calls.
//!
//! The solver-driven harness decides ahead of a run what every mocked call
//! returns. This module holds those decisions:
//!
//! - [`MockRegistry`] - Pending values keyed by call site and receiver
//! - [`MockEntry`] - One ordered queue of values
//! - [`MockReceiver`] - Static or identity-keyed instance receiver
//! - [`Value`] - A primitive or reference result

mod registry;
mod value;

pub use registry::{MockEntry, MockReceiver, MockRegistry};
pub use value::Value;
