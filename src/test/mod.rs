use crate::{
    concolic::{ConcolicRunContext, PathPrefix, RunConfig, TraceEvent},
    ids::{ObjectRef, SymbolId},
    mock::{MockRegistry, Value},
    symbolic::{SymbolicEngine, TargetRuntime},
    trace::TraceCollector,
    Result,
};

/// State of [`StepEngine`]: decided branches, a dead-model flag and the
/// type and hash notifications it received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepState {
    pub decisions: Vec<(SymbolId, bool)>,
    pub model_died: bool,
    pub applied: u64,
    pub fixated: Vec<SymbolId>,
    pub hashed: Vec<SymbolId>,
}

/// Engine that names every result with a fresh symbol and forks every
/// undecided condition into both directions.
#[derive(Debug, Default)]
pub struct StepEngine {
    pub preset: Vec<(SymbolId, bool)>,
}

impl StepEngine {
    // Model that already decided `cond`
    pub fn deciding(cond: SymbolId, value: bool) -> Self {
        StepEngine {
            preset: vec![(cond, value)],
        }
    }
}

impl SymbolicEngine for StepEngine {
    type State = StepState;

    fn apply(&mut self, state: &mut StepState, _event: &TraceEvent) -> Result<Option<SymbolId>> {
        state.applied += 1;
        Ok(Some(SymbolId(1000 + state.applied)))
    }

    fn fork(&mut self, state: &mut StepState, cond: SymbolId) -> Result<Vec<StepState>> {
        if self.expected_branch(state, cond).is_some() {
            return Ok(Vec::new());
        }
        let mut alternative = state.clone();
        alternative.decisions.push((cond, false));
        state.decisions.push((cond, true));
        Ok(vec![alternative])
    }

    fn expected_branch(&self, state: &StepState, cond: SymbolId) -> Option<bool> {
        state
            .decisions
            .iter()
            .find(|(symbol, _)| *symbol == cond)
            .map(|(_, value)| *value)
    }

    fn mark_model_died(&mut self, state: &mut StepState) {
        state.model_died = true;
    }

    fn fixate_type(&mut self, state: &mut StepState, symbol: SymbolId) -> Result<()> {
        state.fixated.push(symbol);
        Ok(())
    }

    fn hash_requested(&mut self, state: &mut StepState, symbol: SymbolId) -> Result<()> {
        state.hashed.push(symbol);
        Ok(())
    }
}

/// Runtime whose calls return the callee and whose mock values become the
/// object with the value's integer payload as address.
#[derive(Debug, Default)]
pub struct NullRuntime;

impl TargetRuntime for NullRuntime {
    fn invoke(&mut self, callee: ObjectRef, _args: &[ObjectRef]) -> Result<ObjectRef> {
        Ok(callee)
    }

    fn materialize(&mut self, value: &Value) -> Result<ObjectRef> {
        let address = match *value {
            Value::Bool(value) => u64::from(value),
            Value::Byte(value) => value as u64,
            Value::Short(value) => value as u64,
            Value::Int(value) => value as u64,
            Value::Long(value) => value as u64,
            Value::Float(value) => value as u64,
            Value::Double(value) => value as u64,
            Value::Char(value) => u64::from(value),
            Value::Object(obj) => obj.0,
            Value::Null => 0,
        };
        Ok(ObjectRef(address))
    }
}

/// Owns everything a context borrows.
pub struct Harness {
    pub engine: StepEngine,
    pub runtime: NullRuntime,
    pub traces: TraceCollector,
    pub mocks: MockRegistry,
    pub config: RunConfig,
}

impl Harness {
    pub fn new(config: RunConfig) -> Self {
        Harness {
            engine: StepEngine::default(),
            runtime: NullRuntime,
            traces: TraceCollector::new(),
            mocks: MockRegistry::new(),
            config,
        }
    }

    pub fn context(
        &mut self,
        prefix: Vec<TraceEvent>,
    ) -> ConcolicRunContext<'_, StepEngine, NullRuntime> {
        self.context_from(PathPrefix::new(prefix))
    }

    pub fn context_from(
        &mut self,
        prefix: PathPrefix,
    ) -> ConcolicRunContext<'_, StepEngine, NullRuntime> {
        let state = StepState {
            decisions: self.engine.preset.clone(),
            ..StepState::default()
        };
        ConcolicRunContext::new(
            &mut self.engine,
            &mut self.runtime,
            &mut self.traces,
            &mut self.mocks,
            &self.config,
            state,
            prefix,
        )
    }
}
