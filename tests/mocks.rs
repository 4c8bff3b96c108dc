//! Mock consumption through the bridge and the runner.

mod common;

use common::{FakeEngine, FakeRuntime, FakeState};
use concolic_trace::prelude::*;

const GLOBAL_FN: ObjectRef = ObjectRef(0xf00);

#[test]
fn test_static_mock_queue_runs_dry() -> Result<()> {
    let mut runner = ConcolicRunner::new(RunConfig::default());
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_static(CallSiteId(42), [10, 20]));

    let mut runtime = FakeRuntime::default();
    let result = runner.run(
        &mut FakeEngine::new(),
        &mut runtime,
        FakeState::default(),
        PathPrefix::empty(),
        |ctx| {
            let first = ctx.intercept_call(CallSiteId(42), MockReceiver::Static, GLOBAL_FN, &[])?;
            let second = ctx.intercept_call(CallSiteId(42), MockReceiver::Static, GLOBAL_FN, &[])?;
            assert_eq!((first, second), (ObjectRef(10), ObjectRef(20)));
            ctx.intercept_call(CallSiteId(42), MockReceiver::Static, GLOBAL_FN, &[])
        },
    );

    match result {
        Err(Error::MockNotFound {
            site,
            receiver,
            consumed,
        }) => {
            assert_eq!(site, CallSiteId(42));
            assert_eq!(receiver, MockReceiver::Static);
            assert_eq!(consumed, 2);
        }
        other => panic!("expected exhausted mock, got {other:?}"),
    }
    assert!(runtime.calls.is_empty());
    assert_eq!(runtime.materialized, vec![Value::Int(10), Value::Int(20)]);
    Ok(())
}

#[test]
fn test_unmocked_calls_reach_the_runtime() -> Result<()> {
    let mut runner = ConcolicRunner::new(RunConfig::default());
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_static(CallSiteId(1), [true]));

    let mut runtime = FakeRuntime::default();
    let report = runner.run(
        &mut FakeEngine::new(),
        &mut runtime,
        FakeState::default(),
        PathPrefix::empty(),
        |ctx| ctx.intercept_call(CallSiteId(2), MockReceiver::Static, GLOBAL_FN, &[ObjectRef(5)]),
    )?;

    assert_eq!(report.return_value, Some(GLOBAL_FN));
    assert_eq!(runtime.calls, vec![(GLOBAL_FN, vec![ObjectRef(5)])]);
    assert_eq!(report.statistics.mock_lookups, 0);
    Ok(())
}

#[test]
fn test_static_mocks_only_apply_during_execution() -> Result<()> {
    let mut engine = FakeEngine::new();
    let mut runtime = FakeRuntime::default();
    let mut traces = TraceCollector::new();
    let mut mocks = MockRegistry::new();
    mocks.add_mock(MockEntry::for_static(CallSiteId(3), [7_i64]));
    mocks.add_mock(MockEntry::for_instance(CallSiteId(3), ObjectRef(0x50), [8_i64]));
    let config = RunConfig::default();

    let mut ctx = ConcolicRunContext::new(
        &mut engine,
        &mut runtime,
        &mut traces,
        &mut mocks,
        &config,
        FakeState::default(),
        PathPrefix::empty(),
    );

    // The harness itself calling the mocked global is not intercepted.
    let real = ctx.intercept_call(CallSiteId(3), MockReceiver::Static, GLOBAL_FN, &[])?;
    assert_eq!(real, GLOBAL_FN);

    // Instance mocks are keyed by identity and apply regardless.
    let instance = ctx.intercept_call(
        CallSiteId(3),
        MockReceiver::Instance(ObjectRef(0x50)),
        GLOBAL_FN,
        &[],
    )?;
    assert_eq!(instance, ObjectRef(8));

    let report = ctx.finish(Ok(()))?;
    assert_eq!(report.statistics.mock_lookups, 1);
    assert_eq!(mocks.pending(CallSiteId(3), MockReceiver::Static), 1);
    Ok(())
}

#[test]
fn test_virtual_objects_answer_slot_operations() -> Result<()> {
    let left = SymbolicHandle::symbolic(ObjectRef(0x10), SymbolId(1));
    let right = SymbolicHandle::symbolic(ObjectRef(0x20), SymbolId(2));

    let mut runner = ConcolicRunner::new(RunConfig::default());
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_instance(CallSiteId(9), ObjectRef(0x20), [Value::Long(64)]));
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_instance(CallSiteId(10), ObjectRef(0x10), [false]));

    let mut runtime = FakeRuntime::default();
    let report = runner.run(
        &mut FakeEngine::new(),
        &mut runtime,
        FakeState::default(),
        PathPrefix::empty(),
        |ctx| {
            // right.__radd__ serves left + right
            ctx.notify_nb_add(left, right);
            let sum = ctx.virtual_call(CallSiteId(9), Some(1))?;

            // bool(left) from inside the addition
            ctx.notify_nb_bool(left);
            let truth = ctx.virtual_call(CallSiteId(10), None)?;
            assert_eq!(ctx.complete_operation()?.method(), SlotMethod::NbBool);

            let outer = ctx.complete_operation()?;
            assert_eq!(outer.owner(), Some(&right));
            Ok((sum, truth))
        },
    )?;

    assert_eq!(report.return_value, Some((ObjectRef(64), ObjectRef(0))));
    assert_eq!(report.statistics.mock_lookups, 2);
    assert!(report.path.is_empty());
    Ok(())
}

#[test]
fn test_typed_virtual_results_end_at_the_next_instruction() -> Result<()> {
    let obj = SymbolicHandle::symbolic(ObjectRef(0x30), SymbolId(3));

    let mut runner = ConcolicRunner::new(RunConfig::default());
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_instance(CallSiteId(11), ObjectRef(0x30), [true]));
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_instance(CallSiteId(12), ObjectRef(0x30), [Value::Int(7)]));
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_static(CallSiteId(12), [Value::Int(0)]));

    let mut runtime = FakeRuntime::default();
    let report = runner.run(
        &mut FakeEngine::new(),
        &mut runtime,
        FakeState::default(),
        PathPrefix::empty(),
        |ctx| {
            // if obj: ... len(obj), the notifications never completed
            ctx.instruction(InstructionId(0), common::CODE)?;
            ctx.notify_nb_bool(obj);
            let truth = ctx.virtual_nb_bool(CallSiteId(11))?;

            ctx.instruction(InstructionId(1), common::CODE)?;
            ctx.notify_sq_length(obj);
            let len = ctx.virtual_sq_length(CallSiteId(12))?;

            ctx.instruction(InstructionId(2), common::CODE)?;
            let unowned = ctx.virtual_sq_length(CallSiteId(12))?;
            Ok((truth, len, unowned))
        },
    )?;

    assert_eq!(report.return_value, Some((true, 7, 0)));
    assert_eq!(report.statistics.mock_lookups, 3);
    assert_eq!(report.statistics.unregistered_virtual_operations, 1);
    assert!(runtime.materialized.is_empty());
    Ok(())
}

#[test]
fn test_unmaterializable_mock_fails_the_run() {
    let mut runner = ConcolicRunner::new(RunConfig::default());
    runner
        .mocks_mut()
        .add_mock(MockEntry::for_static(CallSiteId(4), [2.5_f64]));

    let result = runner.run(
        &mut FakeEngine::new(),
        &mut FakeRuntime::default(),
        FakeState::default(),
        PathPrefix::empty(),
        |ctx| ctx.virtual_call(CallSiteId(4), None),
    );

    assert!(matches!(result, Err(Error::Runtime(_))));
    assert!(!runner.mocks().in_execution());
}
