//! Budget tracking and run statistics.
//!
//! [`EventBudget`] is ticked once per traced event, before the event runs,
//! and reports the first limit the tick crossed. [`RunStatistics`] records
//! what the protocol decided along the way and is reported to the harness at
//! the end of the run.
//!
//! For configurable limits, see [`RunLimits`].

use std::{
    fmt,
    time::{Duration, Instant},
};

use crate::concolic::RunLimits;

/// Event budget and deadline of one run.
///
/// Both limits are resolved from [`RunLimits`] when the run starts; a limit of
/// 0 becomes `None` and is never checked.
#[derive(Clone, Debug)]
pub struct EventBudget {
    events: u64,
    max_events: Option<u64>,
    started: Instant,
    timeout: Option<Duration>,
}

impl EventBudget {
    /// Starts the clock for a run bounded by `limits`.
    #[must_use]
    pub fn start(limits: &RunLimits) -> Self {
        EventBudget {
            events: 0,
            max_events: (limits.max_instructions != 0).then_some(limits.max_instructions),
            started: Instant::now(),
            timeout: (limits.timeout_ms != 0).then(|| Duration::from_millis(limits.timeout_ms)),
        }
    }

    /// Events counted so far, including a rejected one.
    #[must_use]
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Time since the run started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Counts one more event and checks it against both limits.
    ///
    /// # Errors
    ///
    /// Returns the exceeded limit; the event count is checked first.
    pub fn tick(&mut self) -> Result<(), LimitExceeded> {
        self.events += 1;

        if let Some(limit) = self.max_events.filter(|&limit| self.events > limit) {
            return Err(LimitExceeded::Instructions {
                executed: self.events,
                limit,
            });
        }
        if let Some(limit) = self.timeout {
            let elapsed = self.elapsed();
            if elapsed >= limit {
                return Err(LimitExceeded::Timeout { elapsed, limit });
            }
        }
        Ok(())
    }
}

/// Indicates which limit was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Traced event budget was exceeded.
    Instructions {
        /// Number of events traced, including the rejected one.
        executed: u64,
        /// Maximum allowed.
        limit: u64,
    },

    /// Run timeout was exceeded.
    Timeout {
        /// Time elapsed.
        elapsed: Duration,
        /// Timeout limit.
        limit: Duration,
    },
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitExceeded::Instructions { executed, limit } => {
                write!(f, "instruction limit exceeded: {executed} (limit: {limit})")
            }
            LimitExceeded::Timeout { elapsed, limit } => {
                write!(f, "timeout exceeded: {elapsed:?} (limit: {limit:?})")
            }
        }
    }
}

/// What the protocol decided during one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Events matched against the path prefix.
    pub replayed_events: u64,
    /// Events traced beyond the end of the prefix.
    pub explored_events: u64,
    /// Events that ran concretely after the state was dropped.
    pub concrete_events: u64,
    /// Forked states discovered.
    pub forks: u64,
    /// Path diversions observed (at most one per run).
    pub diversions: u64,
    /// Mock values consumed through the bridge.
    pub mock_lookups: u64,
    /// Virtual calls made with no slot operation in flight.
    pub unregistered_virtual_operations: u64,
    /// Places where the interpreter lost a symbolic value, in order.
    pub lost_symbolic_values: Vec<String>,
}
