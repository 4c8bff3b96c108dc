//! In-flight slot operations.
//!
//! When the interpreter dispatches through a type slot on a symbolic object
//! (`__bool__`, `__add__`, `__getitem__`, ...), the bridge is notified before
//! the slot runs. The slot may call back into the bridge, dispatch through
//! another slot, or hit a virtual object that needs a mocked result. Each
//! notification pushes a [`MockHeader`] on the [`OperationStack`]; the
//! matching completion pops it. Nested interceptions therefore never clobber
//! the header of the operation that is still in flight below them.

use strum::Display;

use crate::{
    concolic::CompareOp,
    mock::MockReceiver,
    symbolic::SymbolicHandle,
    Error, Result,
};

/// Type slots whose dispatch is reported to the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SlotMethod {
    /// `nb_bool`
    NbBool,
    /// `nb_int`
    NbInt,
    /// `nb_add`
    NbAdd,
    /// `nb_subtract`
    NbSubtract,
    /// `nb_multiply`
    NbMultiply,
    /// `nb_matrix_multiply`
    NbMatrixMultiply,
    /// `sq_length`
    SqLength,
    /// `mp_subscript`
    MpSubscript,
    /// `mp_ass_subscript`
    MpAssSubscript,
    /// `tp_richcompare` with its comparison.
    #[strum(to_string = "tp_richcompare({0})")]
    TpRichcompare(CompareOp),
    /// `tp_getattro`
    TpGetattro,
    /// `tp_setattro`
    TpSetattro,
    /// `tp_iter`
    TpIter,
    /// `tp_call`
    TpCall,
}

/// Description of a slot operation currently being intercepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockHeader {
    method: SlotMethod,
    args: Vec<SymbolicHandle>,
    owner: Option<SymbolicHandle>,
}

impl MockHeader {
    /// Creates a header for `method` applied to `args`.
    #[must_use]
    pub fn new(method: SlotMethod, args: Vec<SymbolicHandle>, owner: Option<SymbolicHandle>) -> Self {
        MockHeader {
            method,
            args,
            owner,
        }
    }

    /// The slot being dispatched.
    #[must_use]
    pub fn method(&self) -> SlotMethod {
        self.method
    }

    /// The slot's operands.
    #[must_use]
    pub fn args(&self) -> &[SymbolicHandle] {
        &self.args
    }

    /// The object whose slot implementation is being called, once known.
    #[must_use]
    pub fn owner(&self) -> Option<&SymbolicHandle> {
        self.owner.as_ref()
    }

    /// Makes argument `index` the owner of the operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if `index` is out of range.
    pub fn set_owner(&mut self, index: usize) -> Result<()> {
        let Some(owner) = self.args.get(index) else {
            return Err(Error::InvalidOperation(format!(
                "owner index {index} out of range for {} with {} arguments",
                self.method,
                self.args.len()
            )));
        };
        self.owner = Some(*owner);
        Ok(())
    }

    /// Mock key receiver for this operation: the owner's concrete identity,
    /// or static if the owner is unknown or unbound.
    #[must_use]
    pub fn receiver(&self) -> MockReceiver {
        self.owner.and_then(|owner| owner.object()).into()
    }
}

/// Stack of in-flight slot operations, innermost on top.
#[derive(Clone, Debug, Default)]
pub struct OperationStack {
    frames: Vec<MockHeader>,
}

impl OperationStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a newly notified operation.
    pub fn push(&mut self, header: MockHeader) {
        self.frames.push(header);
    }

    /// Pops the innermost operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if no operation is in flight.
    pub fn pop(&mut self) -> Result<MockHeader> {
        self.frames
            .pop()
            .ok_or_else(|| Error::InvalidOperation("no slot operation in flight".to_string()))
    }

    /// The innermost operation.
    #[must_use]
    pub fn top(&self) -> Option<&MockHeader> {
        self.frames.last()
    }

    /// The innermost operation, mutably.
    pub fn top_mut(&mut self) -> Option<&mut MockHeader> {
        self.frames.last_mut()
    }

    /// Number of operations in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no operation is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drops every in-flight operation.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Drops the operations above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}
