//! The per-run context and the path-tracing protocol.
//!
//! A [`ConcolicRunContext`] drives one symbolic execution attempt. It owns
//! the current symbolic state, the path prefix to replay, the forks found so
//! far and the stack of in-flight slot operations. It borrows the engine, the
//! target runtime and both collectors for the duration of the run.
//!
//! Every interception point of the bridge funnels through
//! [`with_tracing`](ConcolicRunContext::with_tracing). For each event it:
//!
//! 1. Counts the event against the budget and polls the cancellation check.
//!    Nothing is checked between events, so one long concrete operation
//!    cannot be interrupted.
//! 2. Runs the operation concretely, without bookkeeping, if the state was
//!    dropped by an earlier diversion.
//! 3. Matches the event against the next prefix entry while entries remain.
//!    A mismatch is a path diversion. If the prefix carries recorded results,
//!    the matched event is not applied again: the state already reflects it,
//!    and [`apply_symbolic`](ConcolicRunContext::apply_symbolic) hands back
//!    the symbol recorded for it.
//! 4. Otherwise records the event as new territory and, for a fork, collects
//!    the engine's alternatives.

mod bridge;

use crate::{
    concolic::{
        EventBudget, ForkedState, OperationStack, PathPrefix, RunConfig, RunPhase, RunReport,
        RunStatistics, RunVerdict, TraceEvent,
    },
    ids::SymbolId,
    mock::MockRegistry,
    symbolic::{SymbolicEngine, SymbolicHandle, TargetRuntime},
    trace::TraceCollector,
    Error, Result,
};

/// State of one concolic run.
///
/// Built fresh for every run. The collectors are borrowed exclusively, so two
/// runs can never share them at the same time.
///
/// # Example
///
/// ```rust,ignore
/// use concolic_trace::prelude::*;
///
/// let mut ctx = ConcolicRunContext::new(
///     &mut engine, &mut runtime, &mut traces, &mut mocks, &config,
///     initial_state, PathPrefix::empty(),
/// );
/// let outcome = interpret(&mut ctx);
/// let report = ctx.finish(outcome)?;
/// println!("{}: {} forks", report.verdict, report.forked_states.len());
/// ```
pub struct ConcolicRunContext<'a, E: SymbolicEngine, R: TargetRuntime> {
    engine: &'a mut E,
    runtime: &'a mut R,
    traces: &'a mut TraceCollector,
    mocks: &'a mut MockRegistry,
    config: &'a RunConfig,
    cancellation: Option<&'a dyn Fn() -> bool>,
    cur_state: Option<E::State>,
    path_prefix: PathPrefix,
    path: Vec<TraceEvent>,
    results: Vec<Option<SymbolId>>,
    in_flight: Option<InFlight>,
    forked_states: Vec<ForkedState<E::State>>,
    operations: OperationStack,
    budget: EventBudget,
    statistics: RunStatistics,
    phase: RunPhase,
    divergence: Option<usize>,
}

impl<'a, E: SymbolicEngine, R: TargetRuntime> ConcolicRunContext<'a, E, R> {
    /// Creates a context in the [`RunPhase::Fresh`] phase and starts its clock.
    ///
    /// # Arguments
    ///
    /// * `engine` - Symbolic engine stepping the state
    /// * `runtime` - Target interpreter, for calls and mock materialization
    /// * `traces` - Coverage collector; the caller decides when to clear it
    /// * `mocks` - Scripted mock values for this run
    /// * `config` - Limits, diversion policy and logging
    /// * `state` - Initial symbolic state
    /// * `path_prefix` - Events to replay before exploring
    #[must_use]
    pub fn new(
        engine: &'a mut E,
        runtime: &'a mut R,
        traces: &'a mut TraceCollector,
        mocks: &'a mut MockRegistry,
        config: &'a RunConfig,
        state: E::State,
        path_prefix: PathPrefix,
    ) -> Self {
        ConcolicRunContext {
            engine,
            runtime,
            traces,
            mocks,
            config,
            cancellation: None,
            cur_state: Some(state),
            path_prefix,
            path: Vec::new(),
            results: Vec::new(),
            in_flight: None,
            forked_states: Vec::new(),
            operations: OperationStack::new(),
            budget: EventBudget::start(&config.limits),
            statistics: RunStatistics::default(),
            phase: RunPhase::Fresh,
            divergence: None,
        }
    }

    /// Installs a cancellation check polled at every event boundary.
    #[must_use]
    pub fn with_cancellation(mut self, check: &'a dyn Fn() -> bool) -> Self {
        self.cancellation = Some(check);
        self
    }

    /// Current protocol phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// The symbolic state, or `None` after a tolerated diversion.
    #[must_use]
    pub fn cur_state(&self) -> Option<&E::State> {
        self.cur_state.as_ref()
    }

    /// The symbolic state, mutably.
    pub fn cur_state_mut(&mut self) -> Option<&mut E::State> {
        self.cur_state.as_mut()
    }

    /// Events traced so far, in order.
    #[must_use]
    pub fn path(&self) -> &[TraceEvent] {
        &self.path
    }

    /// Symbolic result of each traced event, parallel to [`path`](Self::path).
    #[must_use]
    pub fn results(&self) -> &[Option<SymbolId>] {
        &self.results
    }

    /// The prefix being replayed.
    #[must_use]
    pub fn path_prefix(&self) -> &PathPrefix {
        &self.path_prefix
    }

    /// Branches discovered so far.
    #[must_use]
    pub fn forked_states(&self) -> &[ForkedState<E::State>] {
        &self.forked_states
    }

    /// Events counted against the budget.
    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.budget.events()
    }

    /// Protocol decisions so far.
    #[must_use]
    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    /// In-flight slot operations.
    #[must_use]
    pub fn operations(&self) -> &OperationStack {
        &self.operations
    }

    /// The engine.
    pub fn engine(&mut self) -> &mut E {
        self.engine
    }

    /// The trace collector.
    #[must_use]
    pub fn traces(&self) -> &TraceCollector {
        self.traces
    }

    /// The mock registry.
    #[must_use]
    pub fn mocks(&self) -> &MockRegistry {
        self.mocks
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        self.config
    }

    /// Runs `operation` under the path-tracing protocol.
    ///
    /// `operation` receives the context and the event; it performs the
    /// symbolic side of the interception, usually through
    /// [`apply_symbolic`](Self::apply_symbolic).
    ///
    /// # Errors
    ///
    /// - [`Error::BudgetExceeded`] if this event exceeds the budget or timeout
    /// - [`Error::Cancelled`] if the cancellation check fires
    /// - [`Error::PathDiversion`] on a mismatch while diversion is disallowed
    /// - Any error returned by `operation` or by the engine while forking
    pub fn with_tracing<T, F>(&mut self, event: TraceEvent, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Self, &TraceEvent) -> Result<T>,
    {
        self.check_budget()?;

        if self.cur_state.is_none() {
            self.statistics.concrete_events += 1;
            return operation(self, &event);
        }

        if self.phase == RunPhase::Fresh {
            self.phase = if self.path_prefix.is_exhausted() {
                RunPhase::Exploring
            } else {
                RunPhase::Replaying
            };
        }

        let position = self.path.len();
        if let Some(matched) = self
            .path_prefix
            .peek()
            .map(|expected| self.event_matches(expected, &event))
        {
            if matched {
                let recorded = self.path_prefix.peek_result();
                self.path_prefix.advance();
                self.statistics.replayed_events += 1;
                if self.path_prefix.is_exhausted() {
                    self.phase = RunPhase::Exploring;
                }
                self.log_event("replay", position, &event);
                self.path.push(event.clone());
                self.results.push(recorded.flatten());
                return self.run_traced(position, recorded, &event, operation);
            }

            let expected = self
                .path_prefix
                .peek()
                .map(ToString::to_string)
                .unwrap_or_default();
            self.path_diversion(position, expected, event.to_string())?;
            self.statistics.concrete_events += 1;
            return operation(self, &event);
        }

        self.statistics.explored_events += 1;
        self.log_event("explore", position, &event);
        self.path.push(event.clone());
        self.results.push(None);
        let result = self.run_traced(position, None, &event, operation)?;
        if let Some(cond) = event.fork_condition() {
            self.fork_state(cond)?;
        }
        Ok(result)
    }

    /// Applies `event` to the current state through the engine.
    ///
    /// Returns the unbound symbolic result, or `None` if the state was dropped
    /// or the engine produced no symbol. While replaying an event whose result
    /// was recorded, returns that result without stepping the engine. The
    /// result of a traced event is kept for the prefixes of later forks.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn apply_symbolic(&mut self, event: &TraceEvent) -> Result<Option<SymbolicHandle>> {
        let Some(state) = self.cur_state.as_mut() else {
            return Ok(None);
        };
        let in_flight = self.in_flight;
        if let Some(InFlight {
            recorded: Some(symbol),
            ..
        }) = in_flight
        {
            return Ok(symbol.map(SymbolicHandle::unbound));
        }

        let symbol = self.engine.apply(state, event)?;
        if let Some(slot) = in_flight.and_then(|traced| self.results.get_mut(traced.position)) {
            *slot = symbol;
        }
        Ok(symbol.map(SymbolicHandle::unbound))
    }

    /// Checks a decided branch against the model after a traced fork.
    ///
    /// If the last traced event is the fork on `cond` and the model expected
    /// the other direction, the concrete run has left the path: this is a
    /// diversion at the fork's position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathDiversion`] if the branch disagrees with the model
    /// and diversion is disallowed.
    pub fn fork_result(&mut self, cond: &SymbolicHandle, taken: bool) -> Result<()> {
        let Some(symbol) = cond.symbol() else {
            return Ok(());
        };
        let Some(state) = self.cur_state.as_ref() else {
            return Ok(());
        };
        let Some(last) = self.path.last() else {
            return Ok(());
        };

        let forked_here = last
            .fork_condition()
            .and_then(SymbolicHandle::symbol)
            .is_some_and(|recorded| self.engine.aliases(state, recorded, symbol));
        if !forked_here {
            return Ok(());
        }

        match self.engine.expected_branch(state, symbol) {
            Some(expected) if expected != taken => {
                let position = self.path.len() - 1;
                self.path_diversion(
                    position,
                    format!("branch {expected} on {symbol}"),
                    format!("branch {taken} on {symbol}"),
                )
            }
            _ => Ok(()),
        }
    }

    /// Ends the run and builds its report.
    ///
    /// `outcome` is what the target returned. Budget, cancellation and
    /// diversion errors become verdicts; any other error is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `outcome`'s error if it is not a run outcome.
    pub fn finish<T>(mut self, outcome: Result<T>) -> Result<RunReport<E::State, T>> {
        let (verdict, return_value) = match outcome {
            Ok(value) => {
                let verdict = match self.divergence {
                    Some(position) => RunVerdict::Diverged {
                        position,
                        recovered: true,
                    },
                    None => {
                        self.phase = RunPhase::Completed;
                        RunVerdict::Completed
                    }
                };
                (verdict, Some(value))
            }
            Err(error) => match error.run_verdict() {
                Some(verdict) => (verdict, None),
                None => return Err(error),
            },
        };

        if matches!(verdict, RunVerdict::Aborted(_)) {
            self.phase = RunPhase::Aborted;
            self.forked_states.reverse();
        }

        Ok(RunReport {
            verdict,
            return_value,
            final_state: self.cur_state,
            forked_states: self.forked_states,
            path: self.path,
            results: self.results,
            trace: self.traces.trace(),
            instructions: self.budget.events(),
            statistics: self.statistics,
        })
    }

    fn check_budget(&mut self) -> Result<()> {
        if let Err(limit) = self.budget.tick() {
            self.phase = RunPhase::Aborted;
            return Err(Error::BudgetExceeded(limit));
        }
        if self.cancellation.is_some_and(|check| check()) {
            self.phase = RunPhase::Aborted;
            return Err(Error::Cancelled {
                instructions: self.budget.events(),
            });
        }
        Ok(())
    }

    fn run_traced<T, F>(
        &mut self,
        position: usize,
        recorded: Option<Option<SymbolId>>,
        event: &TraceEvent,
        operation: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Self, &TraceEvent) -> Result<T>,
    {
        let outer = self.in_flight.replace(InFlight { position, recorded });
        let result = operation(self, event);
        self.in_flight = outer;
        result
    }

    fn event_matches(&self, expected: &TraceEvent, actual: &TraceEvent) -> bool {
        let Some(state) = self.cur_state.as_ref() else {
            return false;
        };
        expected.matches(actual, |recorded, current| {
            match (recorded.symbol(), current.symbol()) {
                (None, None) => true,
                (Some(a), Some(b)) => self.engine.aliases(state, a, b),
                _ => false,
            }
        })
    }

    fn path_diversion(&mut self, position: usize, expected: String, found: String) -> Result<()> {
        self.statistics.diversions += 1;
        self.divergence.get_or_insert(position);
        self.phase = RunPhase::Diverged;

        if self.config.tracing.log_diversions {
            log::warn!("path diversion at event {position}: expected {expected}, found {found}");
        }

        if let Some(state) = self.cur_state.as_mut() {
            self.engine.mark_model_died(state);
        }

        if !self.config.allow_path_diversion {
            return Err(Error::PathDiversion {
                position,
                expected,
                found,
            });
        }

        self.cur_state = None;
        Ok(())
    }

    fn fork_state(&mut self, cond: &SymbolicHandle) -> Result<()> {
        let Some(symbol) = cond.symbol() else {
            return Ok(());
        };
        let Some(state) = self.cur_state.as_mut() else {
            return Ok(());
        };

        let alternatives = self.engine.fork(state, symbol)?;
        if self.config.tracing.log_forks {
            log::debug!(
                "fork on {symbol} at event {}: {} alternatives",
                self.path.len() - 1,
                alternatives.len()
            );
        }
        for alternative in alternatives {
            self.statistics.forks += 1;
            self.forked_states.push(ForkedState {
                state: alternative,
                path_prefix: PathPrefix::recorded(self.path.clone(), self.results.clone()),
            });
        }
        Ok(())
    }

    fn log_event(&self, mode: &str, position: usize, event: &TraceEvent) {
        if self.config.tracing.log_events {
            log::trace!("{mode} #{position}: {event}");
        }
    }
}

/// The traced event whose operation is running.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    position: usize,
    recorded: Option<Option<SymbolId>>,
}
