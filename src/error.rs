use thiserror::Error;

use crate::{
    concolic::{AbortReason, LimitExceeded, RunVerdict},
    ids::CallSiteId,
    mock::MockReceiver,
};

/// The generic Error type, which covers every failure this library can return.
///
/// The variants fall into two classes the caller must treat differently.
///
/// # Run Outcomes
///
/// These are expected results of a concolic run. [`ConcolicRunner`] folds
/// them into a [`RunVerdict`] instead of returning them as errors:
/// - [`Error::PathDiversion`] - Replay stopped matching the recorded prefix
/// - [`Error::BudgetExceeded`] - The instruction or time budget ran out
/// - [`Error::Cancelled`] - The cancellation check requested a stop
///
/// # Contract Violations
///
/// These point at a pairing bug between the harness that scripts the run and
/// the run itself. They are never retried:
/// - [`Error::MockNotFound`] - A mocked call had no queued value left
/// - [`Error::MockTypeMismatch`] - A typed mock accessor found another type
/// - [`Error::InvalidOperation`] - A bridge call made out of order
/// - [`Error::Runtime`] / [`Error::Engine`] - A collaborator failed
///
/// # Examples
///
/// ```rust,ignore
/// use concolic_trace::Error;
///
/// match registry.get_int_mock_value(site, MockReceiver::Static) {
///     Ok(value) => println!("mocked: {value}"),
///     Err(Error::MockNotFound { site, consumed, .. }) => {
///         eprintln!("{site} ran dry after {consumed} values");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
///
/// [`ConcolicRunner`]: crate::concolic::ConcolicRunner
/// [`RunVerdict`]: crate::concolic::RunVerdict
#[derive(Error, Debug)]
pub enum Error {
    /// The concrete run stopped following the expected symbolic path.
    ///
    /// Raised when a traced event does not match the recorded prefix entry at
    /// the same position, or when a forked branch resolved against the model.
    /// Only surfaces as an error when path diversion is not tolerated.
    #[error("path diversion at event {position}: expected {expected}, found {found}")]
    PathDiversion {
        /// Index of the offending event in the run's event sequence.
        position: usize,
        /// The recorded event that was expected.
        expected: String,
        /// The event the interpreter produced instead.
        found: String,
    },

    /// No queued mock value exists for a call site and receiver.
    ///
    /// Covers both a missing entry (`consumed == 0` and nothing registered)
    /// and an entry whose queue has been exhausted.
    #[error("no mock value for {site} on {receiver} ({consumed} already consumed)")]
    MockNotFound {
        /// The mocked call site.
        site: CallSiteId,
        /// The receiver the lookup was made for.
        receiver: MockReceiver,
        /// How many values the entry had already handed out.
        consumed: usize,
    },

    /// A typed mock accessor found a value of a different type.
    #[error("mock value for {site} has type {found}, expected {expected}")]
    MockTypeMismatch {
        /// The mocked call site.
        site: CallSiteId,
        /// Type the accessor requires.
        expected: &'static str,
        /// Type of the queued value.
        found: &'static str,
    },

    /// The run exhausted its instruction or time budget.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(LimitExceeded),

    /// The external cancellation check asked the run to stop.
    #[error("run cancelled after {instructions} traced events")]
    Cancelled {
        /// Events traced before cancellation was observed.
        instructions: u64,
    },

    /// A bridge operation was invoked in a state that does not allow it.
    ///
    /// For example an owner index past the end of the operation's arguments,
    /// or a slot operation completed while none is in flight.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The target runtime failed to invoke or materialize a value.
    #[error("target runtime error: {0}")]
    Runtime(String),

    /// The symbolic engine failed to apply, fork or evaluate.
    #[error("symbolic engine error: {0}")]
    Engine(String),
}

impl Error {
    /// The verdict a run ends with when it stops on this error.
    ///
    /// `None` for contract violations, which are returned to the caller
    /// instead of being folded into a report.
    #[must_use]
    pub fn run_verdict(&self) -> Option<RunVerdict> {
        match self {
            Error::PathDiversion { position, .. } => Some(RunVerdict::Diverged {
                position: *position,
                recovered: false,
            }),
            Error::BudgetExceeded(limit) => {
                Some(RunVerdict::Aborted(AbortReason::Limit(limit.clone())))
            }
            Error::Cancelled { .. } => Some(RunVerdict::Aborted(AbortReason::Cancelled)),
            _ => None,
        }
    }

    /// Returns `true` for errors that end a run normally.
    ///
    /// Budget exhaustion, cancellation and path diversion are first-class run
    /// outcomes; everything else is a contract violation.
    #[must_use]
    pub fn is_run_outcome(&self) -> bool {
        self.run_verdict().is_some()
    }
}
