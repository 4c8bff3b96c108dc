//! Owner of the per-process collectors.

use crate::{
    concolic::{ConcolicRunContext, PathPrefix, RunConfig, RunReport},
    mock::MockRegistry,
    symbolic::{SymbolicEngine, TargetRuntime},
    trace::TraceCollector,
    Result,
};

/// Runs targets one at a time against a shared trace collector and mock
/// registry.
///
/// The runner lends its collectors to one [`ConcolicRunContext`] per run.
/// Since [`run`](Self::run) takes `&mut self`, two runs can never overlap.
///
/// # Example
///
/// ```rust,ignore
/// use concolic_trace::prelude::*;
///
/// let mut runner = ConcolicRunner::new(RunConfig::exploration());
/// runner
///     .mocks_mut()
///     .add_mock(MockEntry::for_static(CallSiteId(42), [10, 20]));
///
/// let report = runner.run(&mut engine, &mut runtime, state, PathPrefix::empty(), |ctx| {
///     interpreter.call(ctx, target)
/// })?;
///
/// for forked in report.forked_states {
///     queue.push(forked);
/// }
/// ```
#[derive(Debug, Default)]
pub struct ConcolicRunner {
    config: RunConfig,
    traces: TraceCollector,
    mocks: MockRegistry,
}

impl ConcolicRunner {
    /// Creates a runner with empty collectors.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        ConcolicRunner {
            config,
            traces: TraceCollector::new(),
            mocks: MockRegistry::new(),
        }
    }

    /// The configuration applied to every run.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Coverage of the last run.
    #[must_use]
    pub fn traces(&self) -> &TraceCollector {
        &self.traces
    }

    /// The mock registry.
    #[must_use]
    pub fn mocks(&self) -> &MockRegistry {
        &self.mocks
    }

    /// The mock registry, for scripting the next run.
    pub fn mocks_mut(&mut self) -> &mut MockRegistry {
        &mut self.mocks
    }

    /// Drops coverage and every scripted mock.
    pub fn reset(&mut self) {
        self.traces.clear();
        self.mocks.clear();
    }

    /// Runs `target` once under the tracing protocol.
    ///
    /// Coverage is cleared before the run. Scripted mocks are kept, so values
    /// left over from an earlier run are still consumed first.
    ///
    /// # Arguments
    ///
    /// * `engine` - Symbolic engine stepping `state`
    /// * `runtime` - Target interpreter
    /// * `state` - Initial symbolic state
    /// * `prefix` - Events to replay before exploring
    /// * `target` - Drives the interpreter, reporting through the context
    ///
    /// # Errors
    ///
    /// Budget, cancellation and path diversion end up in the report's verdict.
    /// Any other error raised by `target` is returned.
    pub fn run<E, R, T, F>(
        &mut self,
        engine: &mut E,
        runtime: &mut R,
        state: E::State,
        prefix: impl Into<PathPrefix>,
        target: F,
    ) -> Result<RunReport<E::State, T>>
    where
        E: SymbolicEngine,
        R: TargetRuntime,
        F: FnOnce(&mut ConcolicRunContext<'_, E, R>) -> Result<T>,
    {
        self.execute(engine, runtime, state, prefix.into(), None, target)
    }

    /// Like [`run`](Self::run), polling `cancelled` at every event boundary.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_cancellable<E, R, T, F>(
        &mut self,
        engine: &mut E,
        runtime: &mut R,
        state: E::State,
        prefix: impl Into<PathPrefix>,
        cancelled: &dyn Fn() -> bool,
        target: F,
    ) -> Result<RunReport<E::State, T>>
    where
        E: SymbolicEngine,
        R: TargetRuntime,
        F: FnOnce(&mut ConcolicRunContext<'_, E, R>) -> Result<T>,
    {
        self.execute(engine, runtime, state, prefix.into(), Some(cancelled), target)
    }

    fn execute<E, R, T, F>(
        &mut self,
        engine: &mut E,
        runtime: &mut R,
        state: E::State,
        prefix: PathPrefix,
        cancelled: Option<&dyn Fn() -> bool>,
        target: F,
    ) -> Result<RunReport<E::State, T>>
    where
        E: SymbolicEngine,
        R: TargetRuntime,
        F: FnOnce(&mut ConcolicRunContext<'_, E, R>) -> Result<T>,
    {
        log::debug!("starting run with a prefix of {} events", prefix.len());

        self.traces.clear();
        self.mocks.begin_execution();

        let mut ctx = ConcolicRunContext::new(
            engine,
            runtime,
            &mut self.traces,
            &mut self.mocks,
            &self.config,
            state,
            prefix,
        );
        if let Some(check) = cancelled {
            ctx = ctx.with_cancellation(check);
        }

        let outcome = target(&mut ctx);
        let report = ctx.finish(outcome);
        self.mocks.end_execution();

        match &report {
            Ok(report) => log::debug!(
                "run {} after {} events: {} forks, {} instructions covered",
                report.verdict,
                report.instructions,
                report.forked_states.len(),
                report.covered_instructions()
            ),
            Err(error) => log::debug!("run failed: {error}"),
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concolic::{RunLimits, RunVerdict},
        ids::{CallSiteId, InstructionId, ObjectRef},
        mock::{MockEntry, MockReceiver},
        test::{NullRuntime, StepEngine, StepState},
        Error,
    };

    #[test]
    fn test_run_clears_coverage_and_brackets_execution() {
        let mut runner = ConcolicRunner::new(RunConfig::default());
        let mut engine = StepEngine::default();
        let mut runtime = NullRuntime;

        let first = runner
            .run(&mut engine, &mut runtime, StepState::default(), PathPrefix::empty(), |ctx| {
                assert!(ctx.mocks().in_execution());
                ctx.instruction(InstructionId(1), ObjectRef(0))?;
                ctx.instruction(InstructionId(2), ObjectRef(0))
            })
            .unwrap();
        assert!(first.is_completed());
        assert_eq!(first.covered_instructions(), 2);
        assert!(!runner.mocks().in_execution());

        let second = runner
            .run(&mut engine, &mut runtime, StepState::default(), PathPrefix::empty(), |ctx| {
                ctx.instruction(InstructionId(3), ObjectRef(0))
            })
            .unwrap();
        assert_eq!(second.trace.instructions(), vec![InstructionId(3)]);
    }

    #[test]
    fn test_budget_becomes_verdict() {
        let config =
            RunConfig::default().with_limits(RunLimits::new().with_max_instructions(1));
        let mut runner = ConcolicRunner::new(config);

        let report = runner
            .run(
                &mut StepEngine::default(),
                &mut NullRuntime,
                StepState::default(),
                PathPrefix::empty(),
                |ctx| {
                    ctx.function_call(ObjectRef(1))?;
                    ctx.function_return(ObjectRef(1))
                },
            )
            .unwrap();

        assert!(matches!(report.verdict, RunVerdict::Aborted(_)));
        assert!(report.return_value.is_none());
        assert_eq!(report.path.len(), 1);
    }

    #[test]
    fn test_mock_exhaustion_propagates() {
        let mut runner = ConcolicRunner::new(RunConfig::default());
        runner
            .mocks_mut()
            .add_mock(MockEntry::for_static(CallSiteId(42), [10, 20]));

        let result = runner.run(
            &mut StepEngine::default(),
            &mut NullRuntime,
            StepState::default(),
            PathPrefix::empty(),
            |ctx| {
                for _ in 0..3 {
                    ctx.intercept_call(CallSiteId(42), MockReceiver::Static, ObjectRef(9), &[])?;
                }
                Ok(())
            },
        );

        assert!(matches!(result, Err(Error::MockNotFound { consumed: 2, .. })));
        assert!(!runner.mocks().in_execution());

        runner.reset();
        assert!(runner.mocks().is_empty());
    }
}
