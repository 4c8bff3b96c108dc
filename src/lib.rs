// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # concolic-trace
//!
//! Tracing and mock bookkeeping for a concolic executor driving an
//! instrumented interpreter.
//!
//! The interpreter runs the target concretely. At every symbolically relevant
//! operation it calls into a [`concolic::ConcolicRunContext`], which keeps a
//! symbolic engine in lock-step with the concrete run, replays the recorded
//! path of an earlier run and forks a new state at every unexplored branch.
//! Alongside, the crate collects instruction coverage and hands scripted mock
//! values to calls the solver decided to control.
//!
//! ## Features
//!
//! - **Path replay** - Re-runs follow a recorded prefix event by event and
//!   detect the first point where the concrete run leaves it
//! - **Branch forking** - Every new symbolic branch yields a state for the
//!   alternative direction, carrying its own prefix
//! - **Coverage** - Instruction and static field sets with O(1) clear per run
//! - **Mocking** - Ordered value queues per call site, keyed statically or by
//!   receiver identity
//! - **Budgets** - Event count, timeout and cancellation, checked at every
//!   event boundary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use concolic_trace::prelude::*;
//!
//! let mut runner = ConcolicRunner::new(RunConfig::exploration());
//! runner
//!     .mocks_mut()
//!     .add_mock(MockEntry::for_static(CallSiteId(42), [10, 20]));
//!
//! let report = runner.run(&mut engine, &mut runtime, state, PathPrefix::empty(), |ctx| {
//!     ctx.function_call(code)?;
//!     ctx.instruction(InstructionId(0), code)?;
//!     let sum = ctx.binary_op(BinaryOperator::Add, NumericKind::Long, x, ten)?;
//!     ctx.function_return(code)?;
//!     Ok(sum)
//! })?;
//!
//! println!("{}: {} new branches", report.verdict, report.forked_states.len());
//! # Ok::<(), concolic_trace::Error>(())
//! ```
//!
//! ## Collaborators
//!
//! The crate never links against an interpreter or a solver. Both are reached
//! through traits:
//!
//! - [`symbolic::SymbolicEngine`] - Steps states, forks them and answers
//!   model queries
//! - [`symbolic::TargetRuntime`] - Calls back into the interpreter and turns
//!   mock values into live objects
//!
//! ## Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,ignore
/// use concolic_trace::prelude::*;
///
/// let mut runner = ConcolicRunner::new(RunConfig::strict());
/// let report = runner.run(&mut engine, &mut runtime, state, PathPrefix::empty(), target)?;
/// ```
pub mod prelude;

/// Run orchestration: events, the run context, the bridge and the runner.
///
/// # Key Types
///
/// - [`concolic::ConcolicRunContext`] - One run's state and its bridge methods
/// - [`concolic::ConcolicRunner`] - Owns the collectors, serializes runs
/// - [`concolic::TraceEvent`] - The closed set of traced operations
/// - [`concolic::RunReport`] - What a finished run hands back
pub mod concolic;

/// Dense identifiers shared with the instrumentation.
pub mod ids;

/// Scripted mock values and their registry.
pub mod mock;

/// Symbolic handles and the engine and runtime capabilities.
pub mod symbolic;

/// Instruction and static field coverage.
pub mod trace;

/// Hot-path containers.
pub mod utils;

/// `concolic-trace` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `concolic-trace` Error type
///
/// See [`Error::is_run_outcome`] for which variants end a run normally.
///
/// # Examples
///
/// ```rust,ignore
/// use concolic_trace::Error;
///
/// match ctx.virtual_call(site, Some(0)) {
///     Ok(obj) => use_object(obj),
///     Err(Error::MockNotFound { site, .. }) => panic!("harness did not script {site}"),
///     Err(e) => return Err(e),
/// }
/// ```
pub use error::Error;
