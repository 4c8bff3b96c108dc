#![no_main]

use concolic_trace::prelude::*;
use libfuzzer_sys::fuzz_target;

struct Blind;

impl SymbolicEngine for Blind {
    type State = ();

    fn apply(&mut self, _state: &mut (), _event: &TraceEvent) -> Result<Option<SymbolId>> {
        Ok(None)
    }

    fn fork(&mut self, _state: &mut (), _cond: SymbolId) -> Result<Vec<()>> {
        Ok(vec![()])
    }

    fn expected_branch(&self, _state: &(), _cond: SymbolId) -> Option<bool> {
        None
    }

    fn mark_model_died(&mut self, _state: &mut ()) {}
}

struct Echo;

impl TargetRuntime for Echo {
    fn invoke(&mut self, callee: ObjectRef, _args: &[ObjectRef]) -> Result<ObjectRef> {
        Ok(callee)
    }

    fn materialize(&mut self, _value: &Value) -> Result<ObjectRef> {
        Ok(ObjectRef(0))
    }
}

fn drive(ctx: &mut ConcolicRunContext<'_, Blind, Echo>, data: &[u8]) -> Result<()> {
    for chunk in data.chunks(2) {
        let value = u64::from(chunk.get(1).copied().unwrap_or(0));
        match chunk[0] % 4 {
            0 => ctx.instruction(InstructionId(value as u32), ObjectRef(1))?,
            1 => ctx.fork(SymbolicHandle::symbolic(ObjectRef(value), SymbolId(value)))?,
            2 => {
                ctx.load_const(ObjectRef(value))?;
            }
            _ => {
                ctx.binary_op(
                    BinaryOperator::Add,
                    NumericKind::Long,
                    SymbolicHandle::symbolic(ObjectRef(value), SymbolId(value)),
                    SymbolicHandle::symbolic(ObjectRef(2), SymbolId(2)),
                )?;
            }
        }
    }
    Ok(())
}

// Whatever the interpreter does, replaying its own path never diverges.
fuzz_target!(|data: &[u8]| {
    let mut runner = ConcolicRunner::new(RunConfig::strict());
    let first = runner.run(&mut Blind, &mut Echo, (), PathPrefix::empty(), |ctx| {
        drive(ctx, data)
    });
    let Ok(first) = first else {
        return;
    };
    let second = runner.run(&mut Blind, &mut Echo, (), first.path.clone(), |ctx| {
        drive(ctx, data)
    });
    let Ok(second) = second else {
        return;
    };
    assert_eq!(second.statistics.diversions, 0);
    assert_eq!(second.path, first.path);
    assert!(second.forked_states.is_empty());
});
