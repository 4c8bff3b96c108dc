//! Concolic run orchestration.
//!
//! This module ties the collectors and the symbolic boundary together into
//! runs. A run replays the path prefix of an earlier run, then explores new
//! territory, forking a state at every symbolic branch it has not seen yet.
//!
//! # Architecture
//!
//! - [`TraceEvent`] - The closed set of traced operations
//! - [`ConcolicRunContext`] - Per-run state and the path-tracing protocol,
//!   plus the bridge methods the interpreter calls
//! - [`OperationStack`] - Slot operations currently being intercepted
//! - [`ConcolicRunner`] - Owns the collectors and serializes runs
//! - [`RunConfig`] - Budget, diversion policy and logging
//! - [`RunReport`] - Verdict, forks, path and coverage of a finished run
//!
//! # Example
//!
//! ```rust,ignore
//! use concolic_trace::prelude::*;
//!
//! let mut runner = ConcolicRunner::new(RunConfig::strict());
//! let mut pending = vec![ForkedState {
//!     state: engine.initial(),
//!     path_prefix: PathPrefix::empty(),
//! }];
//!
//! while let Some(next) = pending.pop() {
//!     let report = runner.run(&mut engine, &mut runtime, next.state, next.path_prefix, |ctx| {
//!         interpreter.call(ctx, target)
//!     })?;
//!     pending.extend(report.forked_states);
//! }
//! ```

mod config;
mod context;
mod event;
mod operation;
mod prefix;
mod result;
mod runner;
mod stats;

pub use config::{RunConfig, RunLimits, TracingConfig};
pub use context::ConcolicRunContext;
pub use event::{
    handles_compatible, BinaryOperator, CollectionKind, CompareOp, EventKind, MethodName,
    NumericKind, SymbolicMethodId, TraceEvent, UnaryOperator,
};
pub use operation::{MockHeader, OperationStack, SlotMethod};
pub use prefix::PathPrefix;
pub use result::{AbortReason, ForkedState, RunPhase, RunReport, RunVerdict};
pub use runner::ConcolicRunner;
pub use stats::{EventBudget, LimitExceeded, RunStatistics};
