//! Shared fakes for the integration tests.
//!
//! [`FakeEngine`] tracks the concrete value of every symbol it hands out, so
//! that forking and model queries behave like a solver-backed engine on the
//! small programs below. Symbols are derived from the event and its operand
//! symbols, which makes re-applying a replayed event yield the same symbol.

#![allow(dead_code)]

use std::{collections::HashMap, hash::Hasher};

use concolic_trace::prelude::*;
use rustc_hash::FxHasher;

pub const CODE: ObjectRef = ObjectRef(0xc0de);
pub const X: SymbolId = SymbolId(1);

/// Decided branches of one path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FakeState {
    pub decisions: Vec<(SymbolId, bool)>,
    pub model_died: bool,
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    values: HashMap<SymbolId, i64>,
    pub applied: usize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the concrete value the next run feeds for `symbol`.
    pub fn bind_input(&mut self, symbol: SymbolId, value: i64) {
        self.values.insert(symbol, value);
    }

    pub fn value(&self, symbol: SymbolId) -> Option<i64> {
        self.values.get(&symbol).copied()
    }

    fn operand_value(&self, handle: &SymbolicHandle) -> Option<i64> {
        match handle.symbol() {
            Some(symbol) => self.value(symbol),
            None => handle.object().map(|obj| obj.0 as i64),
        }
    }

    fn symbol_for(event: &TraceEvent) -> SymbolId {
        let mut hasher = FxHasher::default();
        hasher.write(event.label().as_bytes());
        if let TraceEvent::LoadConst { constant } = event {
            hasher.write_u64(constant.0);
        }
        for operand in event.operands() {
            match operand.symbol() {
                Some(symbol) => hasher.write_u64(symbol.0),
                None => hasher.write_u64(operand.object().map_or(u64::MAX, |obj| obj.0)),
            }
        }
        SymbolId(hasher.finish() | 1 << 63)
    }

    fn arithmetic(op: BinaryOperator, left: i64, right: i64) -> Result<i64> {
        let value = match op {
            BinaryOperator::Add => left.wrapping_add(right),
            BinaryOperator::Sub => left.wrapping_sub(right),
            BinaryOperator::Mul => left.wrapping_mul(right),
            BinaryOperator::Div | BinaryOperator::TrueDiv | BinaryOperator::Rem if right == 0 => {
                return Err(Error::Engine("division by zero".to_string()))
            }
            BinaryOperator::Div | BinaryOperator::TrueDiv => left / right,
            BinaryOperator::Rem => left % right,
            BinaryOperator::Pow => left.wrapping_pow(right.clamp(0, 63) as u32),
            BinaryOperator::And => i64::from(left != 0 && right != 0),
        };
        Ok(value)
    }

    fn comparison(op: CompareOp, left: i64, right: i64) -> bool {
        match op {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}

impl SymbolicEngine for FakeEngine {
    type State = FakeState;

    fn apply(&mut self, _state: &mut FakeState, event: &TraceEvent) -> Result<Option<SymbolId>> {
        self.applied += 1;
        let value = match event {
            TraceEvent::NextInstruction { .. }
            | TraceEvent::FunctionCall { .. }
            | TraceEvent::Return { .. }
            | TraceEvent::Fork { .. } => return Ok(None),
            TraceEvent::LoadConst { constant } => Some(constant.0 as i64),
            TraceEvent::BinaryOp {
                op, left, right, ..
            } => match (self.operand_value(left), self.operand_value(right)) {
                (Some(left), Some(right)) => Some(Self::arithmetic(*op, left, right)?),
                _ => None,
            },
            TraceEvent::Compare {
                op, left, right, ..
            } => match (self.operand_value(left), self.operand_value(right)) {
                (Some(left), Some(right)) => Some(i64::from(Self::comparison(*op, left, right))),
                _ => None,
            },
            _ => None,
        };

        let symbol = Self::symbol_for(event);
        if let Some(value) = value {
            self.values.insert(symbol, value);
        }
        Ok(Some(symbol))
    }

    fn fork(&mut self, state: &mut FakeState, cond: SymbolId) -> Result<Vec<FakeState>> {
        if self.expected_branch(state, cond).is_some() {
            return Ok(Vec::new());
        }
        let value = self
            .value(cond)
            .ok_or_else(|| Error::Engine(format!("no value for {cond}")))?;
        let taken = value != 0;

        let mut alternative = state.clone();
        alternative.decisions.push((cond, !taken));
        state.decisions.push((cond, taken));
        Ok(vec![alternative])
    }

    fn expected_branch(&self, state: &FakeState, cond: SymbolId) -> Option<bool> {
        state
            .decisions
            .iter()
            .find(|(symbol, _)| *symbol == cond)
            .map(|(_, taken)| *taken)
    }

    fn mark_model_died(&mut self, state: &mut FakeState) {
        state.model_died = true;
    }
}

/// Interpreter stand-in: calls are logged and answered with the callee;
/// integral mock values become objects addressed by their payload.
#[derive(Debug, Default)]
pub struct FakeRuntime {
    pub calls: Vec<(ObjectRef, Vec<ObjectRef>)>,
    pub materialized: Vec<Value>,
}

impl TargetRuntime for FakeRuntime {
    fn invoke(&mut self, callee: ObjectRef, args: &[ObjectRef]) -> Result<ObjectRef> {
        self.calls.push((callee, args.to_vec()));
        Ok(callee)
    }

    fn materialize(&mut self, value: &Value) -> Result<ObjectRef> {
        self.materialized.push(*value);
        match *value {
            Value::Bool(value) => Ok(ObjectRef(u64::from(value))),
            Value::Int(value) => Ok(ObjectRef(value as u64)),
            Value::Long(value) => Ok(ObjectRef(value as u64)),
            Value::Object(obj) => Ok(obj),
            Value::Null => Ok(ObjectRef(0)),
            other => Err(Error::Runtime(format!(
                "cannot materialize {}",
                other.type_name()
            ))),
        }
    }
}

fn bound(handle: Option<SymbolicHandle>, value: i64) -> SymbolicHandle {
    let obj = ObjectRef(value as u64);
    handle.map_or(SymbolicHandle::concrete(obj), |handle| handle.bind(obj))
}

/// The body of `def f(x): return x + 10 if x + 10 > 15 else 0`, instrumented.
///
/// Both constants are loaded symbolically, so every operand of the sum and
/// the comparison is traced. Ten events on either branch; the fork is event 7.
pub fn threshold_program<R: TargetRuntime>(
    ctx: &mut ConcolicRunContext<'_, FakeEngine, R>,
    x_value: i64,
) -> Result<i64> {
    let x = SymbolicHandle::symbolic(ObjectRef(x_value as u64), X);

    ctx.instruction(InstructionId(0), CODE)?;
    let ten = bound(ctx.load_const(ObjectRef(10))?, 10);
    let fifteen = bound(ctx.load_const(ObjectRef(15))?, 15);

    ctx.instruction(InstructionId(1), CODE)?;
    let sum_value = x_value + 10;
    let sum = bound(
        ctx.binary_op(BinaryOperator::Add, NumericKind::Long, x, ten)?,
        sum_value,
    );

    ctx.instruction(InstructionId(2), CODE)?;
    let taken = sum_value > 15;
    let cond = bound(
        ctx.compare(CompareOp::Gt, NumericKind::Long, sum, fifteen)?,
        i64::from(taken),
    );
    ctx.fork(cond)?;
    ctx.fork_result(&cond, taken)?;

    let result = if taken {
        ctx.instruction(InstructionId(3), CODE)?;
        sum_value
    } else {
        ctx.instruction(InstructionId(4), CODE)?;
        0
    };
    ctx.function_return(CODE)?;
    Ok(result)
}

/// Branches on each input symbol in turn, two events per input.
pub fn branch_chain<R: TargetRuntime>(
    ctx: &mut ConcolicRunContext<'_, FakeEngine, R>,
    inputs: &[(SymbolId, bool)],
) -> Result<()> {
    for (index, (symbol, taken)) in inputs.iter().enumerate() {
        ctx.instruction(InstructionId(index as u32), CODE)?;
        let cond = SymbolicHandle::symbolic(ObjectRef(u64::from(*taken)), *symbol);
        ctx.fork(cond)?;
        ctx.fork_result(&cond, *taken)?;
    }
    Ok(())
}

/// Runs [`threshold_program`] with `x` bound to `x_value`.
pub fn run_threshold(
    runner: &mut ConcolicRunner,
    engine: &mut FakeEngine,
    state: FakeState,
    prefix: impl Into<PathPrefix>,
    x_value: i64,
) -> Result<RunReport<FakeState, i64>> {
    engine.bind_input(X, x_value);
    let mut runtime = FakeRuntime::default();
    runner.run(engine, &mut runtime, state, prefix, |ctx| {
        threshold_program(ctx, x_value)
    })
}

/// Installs `env_logger` once so `RUST_LOG` works in tests.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
