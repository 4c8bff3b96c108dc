//! Interpreter-facing interception points.
//!
//! The instrumented interpreter calls these methods at the places where a
//! symbolic shadow has to follow the concrete run. Each traced method turns
//! its arguments into one [`TraceEvent`] and runs it through
//! [`with_tracing`](ConcolicRunContext::with_tracing).
//!
//! An operation with a concrete operand has no symbolic counterpart: it is
//! not traced and returns `Ok(None)`. Instructions, constants, function
//! boundaries, empty object creation, binary slots of virtual objects and
//! symbolic methods are traced unconditionally, since they shape the path
//! even when no symbolic value is involved.
//!
//! Slot notifications are not events. They push a [`MockHeader`] describing
//! the slot being dispatched, so that a virtual object reached from inside the
//! slot can ask for its mocked result through
//! [`virtual_call`](ConcolicRunContext::virtual_call) or one of the typed
//! virtual results. Every instruction boundary drops the headers still in
//! flight.

use std::fmt::Display;

use crate::{
    concolic::{
        BinaryOperator, CollectionKind, CompareOp, MethodName, MockHeader, NumericKind,
        SlotMethod, SymbolicMethodId, TraceEvent, UnaryOperator,
    },
    ids::{CallSiteId, FieldId, InstructionId, ObjectRef},
    mock::MockReceiver,
    symbolic::{SymbolicEngine, SymbolicHandle, TargetRuntime},
    Error, Result,
};

use super::ConcolicRunContext;

impl<E: SymbolicEngine, R: TargetRuntime> ConcolicRunContext<'_, E, R> {
    /// The interpreter is about to execute `instruction` of `code`.
    ///
    /// Drops every slot operation still in flight, then records coverage,
    /// including after a tolerated diversion.
    ///
    /// # Errors
    ///
    /// Returns the budget, cancellation and diversion errors of
    /// [`with_tracing`](Self::with_tracing), and engine failures.
    pub fn instruction(&mut self, instruction: InstructionId, code: ObjectRef) -> Result<()> {
        self.operations.clear();
        self.with_tracing(
            TraceEvent::NextInstruction { instruction, code },
            |ctx, event| {
                ctx.traces.record_instruction(instruction);
                ctx.apply_symbolic(event).map(drop)
            },
        )
    }

    /// A static field was read or written. Coverage only; not traced.
    pub fn static_field_access(&mut self, field: FieldId) {
        self.traces.record_static_field_access(field);
    }

    /// A constant was loaded.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn load_const(&mut self, constant: ObjectRef) -> Result<Option<SymbolicHandle>> {
        self.with_tracing(TraceEvent::LoadConst { constant }, Self::step)
    }

    /// A branch on `cond` is about to be decided.
    ///
    /// When exploring, the engine's alternatives become forked states. Report
    /// the direction actually taken with
    /// [`fork_result`](Self::fork_result).
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn fork(&mut self, cond: SymbolicHandle) -> Result<()> {
        if !cond.is_symbolic() {
            return Ok(());
        }
        self.with_tracing(TraceEvent::Fork { cond }, |_, _| Ok(()))
    }

    /// `iterable` was unpacked into `count` targets.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn unpack(
        &mut self,
        iterable: SymbolicHandle,
        count: usize,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::Unpack { iterable, count })
    }

    /// A binary arithmetic operator.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn binary_op(
        &mut self,
        op: BinaryOperator,
        kind: NumericKind,
        left: SymbolicHandle,
        right: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::BinaryOp {
            op,
            kind,
            left,
            right,
        })
    }

    /// A unary operator.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn unary_op(
        &mut self,
        op: UnaryOperator,
        kind: NumericKind,
        operand: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::UnaryOp { op, kind, operand })
    }

    /// A rich comparison.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn compare(
        &mut self,
        op: CompareOp,
        kind: NumericKind,
        left: SymbolicHandle,
        right: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::Compare {
            op,
            kind,
            left,
            right,
        })
    }

    /// `[elements...]`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn create_list(&mut self, elements: &[SymbolicHandle]) -> Result<Option<SymbolicHandle>> {
        self.create_collection(CollectionKind::List, elements.to_vec())
    }

    /// `(elements...)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn create_tuple(&mut self, elements: &[SymbolicHandle]) -> Result<Option<SymbolicHandle>> {
        self.create_collection(CollectionKind::Tuple, elements.to_vec())
    }

    /// `range(start, stop, step)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn create_range(
        &mut self,
        start: SymbolicHandle,
        stop: SymbolicHandle,
        step: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.create_collection(CollectionKind::Range, vec![start, stop, step])
    }

    /// `start:stop:step`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn create_slice(
        &mut self,
        start: SymbolicHandle,
        stop: SymbolicHandle,
        step: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.create_collection(CollectionKind::Slice, vec![start, stop, step])
    }

    /// A built-in container or identity operation, receiver first.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn method(
        &mut self,
        name: MethodName,
        args: &[SymbolicHandle],
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::Method {
            name,
            args: args.to_vec(),
        })
    }

    /// `list[index]`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_get_item(
        &mut self,
        list: SymbolicHandle,
        index: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::ListGetItem, &[list, index])
    }

    /// `list[index] = value`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_set_item(
        &mut self,
        list: SymbolicHandle,
        index: SymbolicHandle,
        value: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::ListSetItem, &[list, index, value])
    }

    /// `list.append(value)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_append(
        &mut self,
        list: SymbolicHandle,
        value: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::ListAppend, &[list, value])
    }

    /// `list.extend(iterable)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_extend(
        &mut self,
        list: SymbolicHandle,
        iterable: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::ListExtend, &[list, iterable])
    }

    /// `left + right` on lists, or `left += right` when `inplace`.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_concat(
        &mut self,
        left: SymbolicHandle,
        right: SymbolicHandle,
        inplace: bool,
    ) -> Result<Option<SymbolicHandle>> {
        let name = if inplace {
            MethodName::ListInplaceConcat
        } else {
            MethodName::ListConcat
        };
        self.method(name, &[left, right])
    }

    /// `len(list)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn list_len(&mut self, list: SymbolicHandle) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::ListLen, &[list])
    }

    /// `len(tuple)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn tuple_len(&mut self, tuple: SymbolicHandle) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::TupleLen, &[tuple])
    }

    /// `tuple[index]`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn tuple_get_item(
        &mut self,
        tuple: SymbolicHandle,
        index: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::TupleGetItem, &[tuple, index])
    }

    /// `iter(collection)` for lists, tuples and ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] for slices, otherwise see
    /// [`instruction`](Self::instruction).
    pub fn get_iter(
        &mut self,
        kind: CollectionKind,
        collection: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        let name = match kind {
            CollectionKind::List => MethodName::ListIter,
            CollectionKind::Tuple => MethodName::TupleIter,
            CollectionKind::Range => MethodName::RangeIter,
            CollectionKind::Slice => {
                return Err(Error::InvalidOperation("slices are not iterable".to_string()))
            }
        };
        self.method(name, &[collection])
    }

    /// `next(iterator)` on an iterator obtained from [`get_iter`](Self::get_iter).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] for slices, otherwise see
    /// [`instruction`](Self::instruction).
    pub fn iter_next(
        &mut self,
        kind: CollectionKind,
        iterator: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        let name = match kind {
            CollectionKind::List => MethodName::ListIteratorNext,
            CollectionKind::Tuple => MethodName::TupleIteratorNext,
            CollectionKind::Range => MethodName::RangeIteratorNext,
            CollectionKind::Slice => {
                return Err(Error::InvalidOperation("slices are not iterable".to_string()))
            }
        };
        self.method(name, &[iterator])
    }

    /// `left is right`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn is_op(
        &mut self,
        left: SymbolicHandle,
        right: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::IsOp, &[left, right])
    }

    /// `obj is None`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn none_check(&mut self, obj: SymbolicHandle) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::NoneCheck, &[obj])
    }

    /// A unary slot answered by a virtual object.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn virtual_unary_fun(&mut self, obj: SymbolicHandle) -> Result<Option<SymbolicHandle>> {
        self.method(MethodName::VirtualUnaryFun, &[obj])
    }

    /// A binary slot answered by a virtual object.
    ///
    /// Traced even if an operand is concrete: one side of the slot is the
    /// virtual object itself.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn virtual_binary_fun(
        &mut self,
        left: SymbolicHandle,
        right: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        let event = TraceEvent::Method {
            name: MethodName::VirtualBinaryFun,
            args: vec![left, right],
        };
        self.with_tracing(event, Self::step)
    }

    /// Generic attribute lookup `obj.name`.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn get_attr(
        &mut self,
        obj: SymbolicHandle,
        name: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::GetAttr { obj, name })
    }

    /// Generic attribute assignment `obj.name = value`.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn set_attr(
        &mut self,
        obj: SymbolicHandle,
        name: SymbolicHandle,
        value: SymbolicHandle,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::SetAttr { obj, name, value })
    }

    /// A Python-level function identified by `code` was entered.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn function_call(&mut self, code: ObjectRef) -> Result<()> {
        self.with_tracing(TraceEvent::FunctionCall { code }, |ctx, event| {
            ctx.apply_symbolic(event).map(drop)
        })
    }

    /// The function identified by `code` returned.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn function_return(&mut self, code: ObjectRef) -> Result<()> {
        self.with_tracing(TraceEvent::Return { code }, |ctx, event| {
            ctx.apply_symbolic(event).map(drop)
        })
    }

    /// `isinstance(obj, type_ref)`
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn isinstance(
        &mut self,
        obj: SymbolicHandle,
        type_ref: ObjectRef,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::IsinstanceCheck { obj, type_ref })
    }

    /// An instance of `type_ref` was allocated without running `__init__`.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn create_empty_object(&mut self, type_ref: ObjectRef) -> Result<Option<SymbolicHandle>> {
        self.with_tracing(TraceEvent::EmptyObjectCreation { type_ref }, Self::step)
    }

    /// A built-in with a dedicated symbolic model was called.
    ///
    /// Always traced; the model decides what concrete arguments mean.
    ///
    /// # Errors
    ///
    /// See [`instruction`](Self::instruction).
    pub fn symbolic_method(
        &mut self,
        method: SymbolicMethodId,
        receiver: Option<SymbolicHandle>,
        args: &[SymbolicHandle],
    ) -> Result<Option<SymbolicHandle>> {
        let event = TraceEvent::SymbolicMethod {
            method,
            receiver,
            args: args.to_vec(),
        };
        self.with_tracing(event, Self::step)
    }

    /// The interpreter is about to rely on the exact type of `obj`.
    ///
    /// Asks the engine to pin the type of a symbolic `obj`. Not traced;
    /// ignored for concrete objects and after a tolerated diversion.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn fixate_type(&mut self, obj: SymbolicHandle) -> Result<()> {
        let Some(symbol) = obj.symbol() else {
            return Ok(());
        };
        let Some(state) = self.cur_state.as_mut() else {
            return Ok(());
        };
        self.engine.fixate_type(state, symbol)
    }

    /// Pushes a slot operation about to be dispatched.
    ///
    /// Must be balanced by [`complete_operation`](Self::complete_operation).
    pub fn notify_slot(
        &mut self,
        method: SlotMethod,
        args: &[SymbolicHandle],
        owner: Option<SymbolicHandle>,
    ) {
        if self.config.tracing.log_events {
            log::trace!("slot {method} in flight at depth {}", self.operations.depth());
        }
        self.operations
            .push(MockHeader::new(method, args.to_vec(), owner));
    }

    /// `nb_bool` on `obj`.
    pub fn notify_nb_bool(&mut self, obj: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbBool, &[obj], Some(obj));
    }

    /// `nb_int` on `obj`.
    pub fn notify_nb_int(&mut self, obj: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbInt, &[obj], Some(obj));
    }

    /// `nb_add`. The owner is decided by [`virtual_call`](Self::virtual_call).
    pub fn notify_nb_add(&mut self, left: SymbolicHandle, right: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbAdd, &[left, right], None);
    }

    /// `nb_subtract`. The owner is decided by the virtual call.
    pub fn notify_nb_subtract(&mut self, left: SymbolicHandle, right: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbSubtract, &[left, right], None);
    }

    /// `nb_multiply`. The owner is decided by the virtual call.
    pub fn notify_nb_multiply(&mut self, left: SymbolicHandle, right: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbMultiply, &[left, right], None);
    }

    /// `nb_matrix_multiply`. The owner is decided by the virtual call.
    pub fn notify_nb_matrix_multiply(&mut self, left: SymbolicHandle, right: SymbolicHandle) {
        self.notify_slot(SlotMethod::NbMatrixMultiply, &[left, right], None);
    }

    /// `sq_length` on `obj`.
    pub fn notify_sq_length(&mut self, obj: SymbolicHandle) {
        self.notify_slot(SlotMethod::SqLength, &[obj], Some(obj));
    }

    /// `mp_subscript`: `storage[item]`.
    pub fn notify_mp_subscript(&mut self, storage: SymbolicHandle, item: SymbolicHandle) {
        self.notify_slot(SlotMethod::MpSubscript, &[storage, item], Some(storage));
    }

    /// `mp_ass_subscript`: `storage[item] = value`.
    pub fn notify_mp_ass_subscript(
        &mut self,
        storage: SymbolicHandle,
        item: SymbolicHandle,
        value: SymbolicHandle,
    ) {
        self.notify_slot(
            SlotMethod::MpAssSubscript,
            &[storage, item, value],
            Some(storage),
        );
    }

    /// `tp_richcompare` with `op`. The owner is decided by the virtual call.
    pub fn notify_tp_richcompare(
        &mut self,
        op: CompareOp,
        left: SymbolicHandle,
        right: SymbolicHandle,
    ) {
        self.notify_slot(SlotMethod::TpRichcompare(op), &[left, right], None);
    }

    /// `tp_getattro`: `obj.name`.
    pub fn notify_tp_getattro(&mut self, obj: SymbolicHandle, name: SymbolicHandle) {
        self.notify_slot(SlotMethod::TpGetattro, &[obj, name], Some(obj));
    }

    /// `tp_setattro`: `obj.name = value`.
    pub fn notify_tp_setattro(
        &mut self,
        obj: SymbolicHandle,
        name: SymbolicHandle,
        value: SymbolicHandle,
    ) {
        self.notify_slot(SlotMethod::TpSetattro, &[obj, name, value], Some(obj));
    }

    /// `tp_iter` on `obj`.
    pub fn notify_tp_iter(&mut self, obj: SymbolicHandle) {
        self.notify_slot(SlotMethod::TpIter, &[obj], Some(obj));
    }

    /// `tp_hash` on `obj`.
    ///
    /// The hash is computed concretely, so no operation is pushed; the engine
    /// is told that a symbolic `obj` is being hashed.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn notify_tp_hash(&mut self, obj: SymbolicHandle) -> Result<()> {
        let Some(symbol) = obj.symbol() else {
            return Ok(());
        };
        let Some(state) = self.cur_state.as_mut() else {
            return Ok(());
        };
        if self.config.tracing.log_events {
            log::trace!("tp_hash on {symbol}");
        }
        self.engine.hash_requested(state, symbol)
    }

    /// `tp_call`: `callable(args...)`.
    pub fn notify_tp_call(&mut self, callable: SymbolicHandle, args: &[SymbolicHandle]) {
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(callable);
        operands.extend_from_slice(args);
        self.notify_slot(SlotMethod::TpCall, &operands, Some(callable));
    }

    /// Pops the innermost slot operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if no operation is in flight.
    pub fn complete_operation(&mut self) -> Result<MockHeader> {
        self.operations.pop()
    }

    /// Runs `body` with `header` in flight, popping it afterwards even if
    /// `body` fails.
    ///
    /// An instruction inside `body` drops the header along with everything
    /// else in flight; nothing is left to pop then.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or [`Error::InvalidOperation`] if `body`
    /// left operations of its own in flight.
    pub fn with_operation<T, F>(&mut self, header: MockHeader, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let depth = self.operations.depth();
        self.operations.push(header);
        let result = body(self);
        let found = self.operations.depth();
        if found > depth + 1 {
            self.operations.truncate(depth);
            return Err(Error::InvalidOperation(format!(
                "operation stack unbalanced: expected depth {}, found {found}",
                depth + 1
            )));
        }
        if found == depth + 1 {
            self.operations.pop()?;
        }
        result
    }

    /// A virtual object needs the mocked result of the in-flight slot.
    ///
    /// `owner` is the index of the argument whose slot is being served; it
    /// becomes the receiver of the mock lookup. Without an in-flight
    /// operation the lookup is static and the call is counted as
    /// unregistered.
    ///
    /// Not a traced event.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOperation`] if `owner` is out of range
    /// - [`Error::MockNotFound`] if no value is queued
    /// - [`Error::Runtime`] if the value cannot be materialized
    pub fn virtual_call(&mut self, site: CallSiteId, owner: Option<usize>) -> Result<ObjectRef> {
        let receiver = self.virtual_receiver(site, owner)?;
        self.mocked_result(site, receiver)
    }

    /// A virtual object's `nb_bool` needs its mocked truth value.
    ///
    /// The receiver is the owner of the in-flight operation, as for
    /// [`virtual_call`](Self::virtual_call). Not a traced event.
    ///
    /// # Errors
    ///
    /// - [`Error::MockNotFound`] if no value is queued
    /// - [`Error::MockTypeMismatch`] if the next value is not a `bool`
    pub fn virtual_nb_bool(&mut self, site: CallSiteId) -> Result<bool> {
        let receiver = self.virtual_receiver(site, None)?;
        let value = self.mocks.get_bool_mock_value(site, receiver)?;
        self.mock_consumed(site, receiver, &value);
        Ok(value)
    }

    /// A virtual object's `sq_length` needs its mocked length.
    ///
    /// Not a traced event.
    ///
    /// # Errors
    ///
    /// - [`Error::MockNotFound`] if no value is queued
    /// - [`Error::MockTypeMismatch`] if the next value is not an `int`
    pub fn virtual_sq_length(&mut self, site: CallSiteId) -> Result<i32> {
        let receiver = self.virtual_receiver(site, None)?;
        let value = self.mocks.get_int_mock_value(site, receiver)?;
        self.mock_consumed(site, receiver, &value);
        Ok(value)
    }

    /// Routes a call the harness may have mocked.
    ///
    /// A mocked `(site, receiver)` returns its next scripted value. Static
    /// mocks only apply while the target is executing, so harness code
    /// calling the same function is never intercepted. Anything else calls
    /// `callee` for real.
    ///
    /// # Errors
    ///
    /// Mock lookup and materialization errors, or the runtime's error for a
    /// real call.
    pub fn intercept_call(
        &mut self,
        site: CallSiteId,
        receiver: MockReceiver,
        callee: ObjectRef,
        args: &[ObjectRef],
    ) -> Result<ObjectRef> {
        let active = receiver != MockReceiver::Static || self.mocks.in_execution();
        if active && self.mocks.is_mocked(site, receiver) {
            return self.mocked_result(site, receiver);
        }
        self.runtime.invoke(callee, args)
    }

    /// The interpreter lost track of a symbolic value at `location`.
    ///
    /// The run continues concretely for that value; the location is reported
    /// in the run statistics.
    pub fn lost_symbolic_value(&mut self, location: impl Into<String>) {
        let location = location.into();
        log::debug!("symbolic value lost at {location}");
        self.statistics.lost_symbolic_values.push(location);
    }

    fn virtual_receiver(&mut self, site: CallSiteId, owner: Option<usize>) -> Result<MockReceiver> {
        match self.operations.top_mut() {
            Some(header) => {
                if let Some(index) = owner {
                    header.set_owner(index)?;
                }
                Ok(header.receiver())
            }
            None => {
                self.statistics.unregistered_virtual_operations += 1;
                log::debug!("virtual call at {site} with no slot operation in flight");
                Ok(MockReceiver::Static)
            }
        }
    }

    fn mocked_result(&mut self, site: CallSiteId, receiver: MockReceiver) -> Result<ObjectRef> {
        let value = self.mocks.get_mock_value(site, receiver)?;
        self.mock_consumed(site, receiver, &value);
        self.runtime.materialize(&value)
    }

    fn mock_consumed(&mut self, site: CallSiteId, receiver: MockReceiver, value: &dyn Display) {
        self.statistics.mock_lookups += 1;
        if self.config.tracing.log_mocks {
            log::debug!("mock {site} on {receiver} -> {value}");
        }
    }

    fn create_collection(
        &mut self,
        kind: CollectionKind,
        elements: Vec<SymbolicHandle>,
    ) -> Result<Option<SymbolicHandle>> {
        self.trace_symbolic(TraceEvent::CreateCollection { kind, elements })
    }

    fn trace_symbolic(&mut self, event: TraceEvent) -> Result<Option<SymbolicHandle>> {
        if !event.operands().iter().all(|handle| handle.is_symbolic()) {
            return Ok(None);
        }
        self.with_tracing(event, Self::step)
    }

    fn step(&mut self, event: &TraceEvent) -> Result<Option<SymbolicHandle>> {
        self.apply_symbolic(event)
    }
}
