//! Capabilities the run context consumes from its collaborators.

use crate::{
    concolic::TraceEvent,
    ids::{ObjectRef, SymbolId},
    mock::Value,
    Result,
};

/// The symbolic side of a concolic run.
///
/// The engine owns the symbolic heap, path constraints and models. The run
/// context never inspects a state; it only hands states back to the engine
/// and collects the ones the engine forks off.
///
/// # Implementing an Engine
///
/// ```rust,ignore
/// use concolic_trace::prelude::*;
///
/// struct Solverless;
///
/// impl SymbolicEngine for Solverless {
///     type State = Vec<(SymbolId, bool)>;
///
///     fn apply(&mut self, _state: &mut Self::State, _event: &TraceEvent) -> Result<Option<SymbolId>> {
///         Ok(None)
///     }
///
///     fn fork(&mut self, _state: &mut Self::State, _cond: SymbolId) -> Result<Vec<Self::State>> {
///         Ok(Vec::new())
///     }
///
///     fn expected_branch(&self, state: &Self::State, cond: SymbolId) -> Option<bool> {
///         state.iter().find(|(s, _)| *s == cond).map(|(_, v)| *v)
///     }
///
///     fn mark_model_died(&mut self, state: &mut Self::State) {
///         state.clear();
///     }
/// }
/// ```
pub trait SymbolicEngine {
    /// One symbolic execution state: path constraints plus a model.
    type State;

    /// Applies the effect of `event` to `state`.
    ///
    /// # Arguments
    ///
    /// * `state` - The state being stepped
    /// * `event` - The operation the interpreter is about to perform
    ///
    /// # Returns
    ///
    /// The symbol naming the operation's result, or `None` if the result has no
    /// symbolic counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Engine`] if the operation cannot be modelled.
    fn apply(&mut self, state: &mut Self::State, event: &TraceEvent) -> Result<Option<SymbolId>>;

    /// Splits `state` on the branch condition `cond`.
    ///
    /// `state` keeps following the direction its model chooses; every feasible
    /// alternative is returned as a new state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Engine`] if the solver fails.
    fn fork(&mut self, state: &mut Self::State, cond: SymbolId) -> Result<Vec<Self::State>>;

    /// The direction the model of `state` expects `cond` to take.
    ///
    /// `None` means the model does not constrain `cond`.
    fn expected_branch(&self, state: &Self::State, cond: SymbolId) -> Option<bool>;

    /// Returns `true` if `left` and `right` denote the same value in `state`.
    ///
    /// Replay uses this to decide whether recorded operands are compatible with
    /// the operands of a re-run. The default is symbol identity.
    fn aliases(&self, state: &Self::State, left: SymbolId, right: SymbolId) -> bool {
        let _ = state;
        left == right
    }

    /// Records that the concrete run no longer follows the model of `state`.
    fn mark_model_died(&mut self, state: &mut Self::State);

    /// Pins the type of the symbolic object `symbol` to its concrete type.
    ///
    /// Called when the interpreter is about to depend on the exact type of a
    /// symbolic object, so the engine stops considering other types for it.
    /// The default does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Engine`] if the object cannot be resolved.
    fn fixate_type(&mut self, state: &mut Self::State, symbol: SymbolId) -> Result<()> {
        let _ = (state, symbol);
        Ok(())
    }

    /// Notes that the symbolic object `symbol` is being hashed.
    ///
    /// The hash of a symbolic object is computed concretely; an engine may
    /// constrain the object so that its hash stays valid. The default does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Engine`] if the object cannot be resolved.
    fn hash_requested(&mut self, state: &mut Self::State, symbol: SymbolId) -> Result<()> {
        let _ = (state, symbol);
        Ok(())
    }
}

/// The target interpreter, seen from the tracing core.
///
/// Implemented by the interpreter binding in production and by fakes in
/// tests, so the core never links against a foreign runtime.
pub trait TargetRuntime {
    /// Calls `callee` with `args` inside the interpreter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Runtime`] if the call raised or the callee is
    /// not callable.
    fn invoke(&mut self, callee: ObjectRef, args: &[ObjectRef]) -> Result<ObjectRef>;

    /// Produces a live interpreter object for a scripted mock value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Runtime`] if the value cannot be represented.
    fn materialize(&mut self, value: &Value) -> Result<ObjectRef>;
}
