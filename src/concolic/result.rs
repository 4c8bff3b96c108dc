//! Run phases and run results.
//!
//! A [`ConcolicRunContext`](crate::concolic::ConcolicRunContext) moves through
//! [`RunPhase`]s as the interpreter feeds it events. When the target returns
//! or the run stops, the context is finished into a [`RunReport`] whose
//! [`RunVerdict`] is what the outer scheduler branches on.

use std::fmt;

use crate::{
    concolic::{LimitExceeded, PathPrefix, RunStatistics, TraceEvent},
    ids::SymbolId,
    trace::Trace,
};

/// Where a run context stands in the replay/explore protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No event has been traced yet.
    Fresh,
    /// Events are being matched against the remaining path prefix.
    Replaying,
    /// The prefix is exhausted; new events extend the path.
    Exploring,
    /// Replay mismatched; the state was dropped or the run ended.
    Diverged,
    /// The target returned normally.
    Completed,
    /// Budget, timeout or cancellation stopped the run.
    Aborted,
}

impl RunPhase {
    /// Returns `true` for phases no event can leave.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Aborted)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Fresh => "fresh",
            RunPhase::Replaying => "replaying",
            RunPhase::Exploring => "exploring",
            RunPhase::Diverged => "diverged",
            RunPhase::Completed => "completed",
            RunPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a run was aborted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// The event budget or timeout ran out.
    Limit(LimitExceeded),
    /// The cancellation check asked to stop.
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Limit(limit) => write!(f, "{limit}"),
            AbortReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Final verdict of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunVerdict {
    /// The target returned and every event followed the symbolic path.
    Completed,

    /// The concrete run left the expected path.
    Diverged {
        /// Index of the first mismatching event.
        position: usize,
        /// `true` if the target ran on concretely after the diversion.
        recovered: bool,
    },

    /// The run stopped early.
    Aborted(AbortReason),
}

impl fmt::Display for RunVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunVerdict::Completed => write!(f, "completed"),
            RunVerdict::Diverged {
                position,
                recovered: true,
            } => write!(f, "diverged at event {position}, finished concretely"),
            RunVerdict::Diverged {
                position,
                recovered: false,
            } => write!(f, "diverged at event {position}"),
            RunVerdict::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// A branch discovered during exploration, to be run later.
#[derive(Clone, Debug)]
pub struct ForkedState<S> {
    /// The engine's state for the alternative branch.
    pub state: S,
    /// Recorded path up to and including the fork, with the symbolic result
    /// of every event; the future run's prefix.
    ///
    /// `state` already reflects these events, so replaying the prefix never
    /// steps the engine again.
    pub path_prefix: PathPrefix,
}

/// Everything a finished run hands back to the scheduler.
#[derive(Debug)]
pub struct RunReport<S, T> {
    /// The verdict.
    pub verdict: RunVerdict,
    /// The target's concrete result, if it returned.
    pub return_value: Option<T>,
    /// The symbolic state at the end, unless it was dropped on diversion.
    pub final_state: Option<S>,
    /// Newly discovered branches.
    ///
    /// In discovery order, except after an abort where the most recent fork
    /// comes first.
    pub forked_states: Vec<ForkedState<S>>,
    /// Every traced event of the run, in order.
    pub path: Vec<TraceEvent>,
    /// Symbolic result of each event in `path`.
    pub results: Vec<Option<SymbolId>>,
    /// Coverage recorded by the trace collector.
    pub trace: Trace,
    /// Events traced, counting the one rejected by the budget.
    pub instructions: u64,
    /// Protocol decisions.
    pub statistics: RunStatistics,
}

impl<S, T> RunReport<S, T> {
    /// Returns `true` if the run completed without diverging.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.verdict == RunVerdict::Completed
    }

    /// The diversion position, if the run diverged.
    #[must_use]
    pub fn divergence(&self) -> Option<usize> {
        match self.verdict {
            RunVerdict::Diverged { position, .. } => Some(position),
            _ => None,
        }
    }

    /// The run's path with its results, as a prefix for re-running
    /// [`final_state`](Self::final_state).
    #[must_use]
    pub fn recorded_prefix(&self) -> PathPrefix {
        PathPrefix::recorded(self.path.clone(), self.results.clone())
    }

    /// Number of distinct instructions covered.
    #[must_use]
    pub fn covered_instructions(&self) -> usize {
        self.trace.instruction_count()
    }
}
