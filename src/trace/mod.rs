//! Coverage collection for concrete runs.
//!
//! See [`TraceCollector`] for the recorder and [`Trace`] for the snapshot read
//! at the end of a run.

mod collector;

pub use collector::{Trace, TraceCollector};
