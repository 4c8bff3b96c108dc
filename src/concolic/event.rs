//! The closed set of traced operations.
//!
//! Every interception point of the bridge produces exactly one [`TraceEvent`].
//! A run's ordered event list is its path; a previous run's path replayed
//! against a new run is its path prefix.
//!
//! # Matching
//!
//! Two events match when they have the same [`EventKind`], the same operator,
//! name or count fields, and pairwise compatible operand handles. Compatibility
//! of handles is decided by the caller (the run context asks the symbolic
//! engine about aliasing); [`handles_compatible`] is the identity-based
//! default.

use std::fmt;

use strum::{AsRefStr, Display, EnumCount, EnumIter};

use crate::{
    ids::{InstructionId, ObjectRef},
    symbolic::SymbolicHandle,
};

/// Numeric domain of an arithmetic or comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NumericKind {
    /// Arbitrary precision integers.
    Long,
    /// Floating point numbers.
    Float,
}

/// Binary arithmetic and logical operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryOperator {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a // b`
    Div,
    /// `a % b`
    Rem,
    /// `a ** b`
    Pow,
    /// `a / b`
    TrueDiv,
    /// `a and b`
    And,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum UnaryOperator {
    /// `-a`
    Neg,
    /// `+a`
    Pos,
    /// `~a`
    Invert,
    /// `not a`
    Not,
}

/// Rich comparison operators, in the interpreter's numbering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Decodes the interpreter's raw comparison opcode (`0` is `<`).
    #[must_use]
    pub fn from_raw(op: i32) -> Option<Self> {
        match op {
            0 => Some(CompareOp::Lt),
            1 => Some(CompareOp::Le),
            2 => Some(CompareOp::Eq),
            3 => Some(CompareOp::Ne),
            4 => Some(CompareOp::Gt),
            5 => Some(CompareOp::Ge),
            _ => None,
        }
    }
}

/// Collections built by dedicated bytecodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CollectionKind {
    /// `[a, b, c]`
    List,
    /// `(a, b, c)`
    Tuple,
    /// `range(start, stop, step)`
    Range,
    /// `start:stop:step`
    Slice,
}

/// Built-in container and identity operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MethodName {
    /// `list[i]`
    ListGetItem,
    /// `list[i] = v`
    ListSetItem,
    /// `list.append(v)`
    ListAppend,
    /// `list.extend(t)`
    ListExtend,
    /// `a + b` on lists
    ListConcat,
    /// `a += b` on lists
    ListInplaceConcat,
    /// `len(list)`
    ListLen,
    /// `iter(list)`
    ListIter,
    /// `next(list_iterator)`
    ListIteratorNext,
    /// `len(tuple)`
    TupleLen,
    /// `tuple[i]`
    TupleGetItem,
    /// `iter(tuple)`
    TupleIter,
    /// `next(tuple_iterator)`
    TupleIteratorNext,
    /// `iter(range)`
    RangeIter,
    /// `next(range_iterator)`
    RangeIteratorNext,
    /// `a is b`
    IsOp,
    /// `a is None`
    NoneCheck,
    /// A unary slot served by a virtual object.
    VirtualUnaryFun,
    /// A binary slot served by a virtual object.
    VirtualBinaryFun,
}

/// Built-in functions with a dedicated symbolic model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SymbolicMethodId {
    /// `int(x)`
    Int,
    /// `float(x)`
    Float,
    /// `list.append`
    ListAppend,
    /// `list.insert`
    ListInsert,
    /// `list.pop`
    ListPop,
    /// `list.extend`
    ListExtend,
    /// `list.clear`
    ListClear,
}

/// One symbolically relevant operation performed by the interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// The interpreter is about to execute an instruction.
    NextInstruction {
        /// Instrumented location.
        instruction: InstructionId,
        /// Code object containing the instruction.
        code: ObjectRef,
    },

    /// A constant was loaded.
    LoadConst {
        /// The constant object.
        constant: ObjectRef,
    },

    /// A conditional branch is about to be decided.
    Fork {
        /// The branch condition.
        cond: SymbolicHandle,
    },

    /// An iterable was unpacked into a fixed number of targets.
    Unpack {
        /// The unpacked iterable.
        iterable: SymbolicHandle,
        /// Number of targets.
        count: usize,
    },

    /// A binary arithmetic operator.
    BinaryOp {
        /// The operator.
        op: BinaryOperator,
        /// Numeric domain.
        kind: NumericKind,
        /// Left operand.
        left: SymbolicHandle,
        /// Right operand.
        right: SymbolicHandle,
    },

    /// A unary operator.
    UnaryOp {
        /// The operator.
        op: UnaryOperator,
        /// Numeric domain.
        kind: NumericKind,
        /// The operand.
        operand: SymbolicHandle,
    },

    /// A rich comparison.
    Compare {
        /// The comparison.
        op: CompareOp,
        /// Numeric domain.
        kind: NumericKind,
        /// Left operand.
        left: SymbolicHandle,
        /// Right operand.
        right: SymbolicHandle,
    },

    /// A list, tuple, range or slice was built.
    CreateCollection {
        /// What was built.
        kind: CollectionKind,
        /// Elements, or `start`, `stop` and `step` for ranges and slices.
        elements: Vec<SymbolicHandle>,
    },

    /// A built-in container or identity operation.
    Method {
        /// The operation.
        name: MethodName,
        /// Operands, receiver first.
        args: Vec<SymbolicHandle>,
    },

    /// Generic attribute lookup.
    GetAttr {
        /// The object.
        obj: SymbolicHandle,
        /// The attribute name.
        name: SymbolicHandle,
    },

    /// Generic attribute assignment.
    SetAttr {
        /// The object.
        obj: SymbolicHandle,
        /// The attribute name.
        name: SymbolicHandle,
        /// The assigned value.
        value: SymbolicHandle,
    },

    /// A Python-level function was entered.
    FunctionCall {
        /// Code object of the callee.
        code: ObjectRef,
    },

    /// A Python-level function returned.
    Return {
        /// Code object of the returning function.
        code: ObjectRef,
    },

    /// `isinstance(obj, type)`.
    IsinstanceCheck {
        /// The checked object.
        obj: SymbolicHandle,
        /// The type object.
        type_ref: ObjectRef,
    },

    /// An instance was allocated without running its initializer.
    EmptyObjectCreation {
        /// The instantiated type.
        type_ref: ObjectRef,
    },

    /// A built-in with a dedicated symbolic model was called.
    SymbolicMethod {
        /// The built-in.
        method: SymbolicMethodId,
        /// Bound receiver, for methods.
        receiver: Option<SymbolicHandle>,
        /// Positional arguments.
        args: Vec<SymbolicHandle>,
    },
}

/// Tags of [`TraceEvent`], enumerable for exhaustive testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// [`TraceEvent::NextInstruction`]
    NextInstruction,
    /// [`TraceEvent::LoadConst`]
    LoadConst,
    /// [`TraceEvent::Fork`]
    Fork,
    /// [`TraceEvent::Unpack`]
    Unpack,
    /// [`TraceEvent::BinaryOp`]
    BinaryOp,
    /// [`TraceEvent::UnaryOp`]
    UnaryOp,
    /// [`TraceEvent::Compare`]
    Compare,
    /// [`TraceEvent::CreateCollection`]
    CreateCollection,
    /// [`TraceEvent::Method`]
    Method,
    /// [`TraceEvent::GetAttr`]
    GetAttr,
    /// [`TraceEvent::SetAttr`]
    SetAttr,
    /// [`TraceEvent::FunctionCall`]
    FunctionCall,
    /// [`TraceEvent::Return`]
    Return,
    /// [`TraceEvent::IsinstanceCheck`]
    IsinstanceCheck,
    /// [`TraceEvent::EmptyObjectCreation`]
    EmptyObjectCreation,
    /// [`TraceEvent::SymbolicMethod`]
    SymbolicMethod,
}

impl TraceEvent {
    /// The event's tag.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            TraceEvent::NextInstruction { .. } => EventKind::NextInstruction,
            TraceEvent::LoadConst { .. } => EventKind::LoadConst,
            TraceEvent::Fork { .. } => EventKind::Fork,
            TraceEvent::Unpack { .. } => EventKind::Unpack,
            TraceEvent::BinaryOp { .. } => EventKind::BinaryOp,
            TraceEvent::UnaryOp { .. } => EventKind::UnaryOp,
            TraceEvent::Compare { .. } => EventKind::Compare,
            TraceEvent::CreateCollection { .. } => EventKind::CreateCollection,
            TraceEvent::Method { .. } => EventKind::Method,
            TraceEvent::GetAttr { .. } => EventKind::GetAttr,
            TraceEvent::SetAttr { .. } => EventKind::SetAttr,
            TraceEvent::FunctionCall { .. } => EventKind::FunctionCall,
            TraceEvent::Return { .. } => EventKind::Return,
            TraceEvent::IsinstanceCheck { .. } => EventKind::IsinstanceCheck,
            TraceEvent::EmptyObjectCreation { .. } => EventKind::EmptyObjectCreation,
            TraceEvent::SymbolicMethod { .. } => EventKind::SymbolicMethod,
        }
    }

    /// Handler-style name, such as `add_long`, `create_list` or `fork`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            TraceEvent::BinaryOp { op, kind, .. } => format!("{op}_{kind}"),
            TraceEvent::UnaryOp { op, kind, .. } => format!("{op}_{kind}"),
            TraceEvent::Compare { op, kind, .. } => format!("{op}_{kind}"),
            TraceEvent::CreateCollection { kind, .. } => format!("create_{kind}"),
            TraceEvent::Method { name, .. } => name.to_string(),
            TraceEvent::SymbolicMethod { method, .. } => format!("symbolic_method_{method}"),
            other => other.kind().to_string(),
        }
    }

    /// Operand handles in positional order.
    #[must_use]
    pub fn operands(&self) -> Vec<&SymbolicHandle> {
        match self {
            TraceEvent::NextInstruction { .. }
            | TraceEvent::LoadConst { .. }
            | TraceEvent::FunctionCall { .. }
            | TraceEvent::Return { .. }
            | TraceEvent::EmptyObjectCreation { .. } => Vec::new(),
            TraceEvent::Fork { cond } => vec![cond],
            TraceEvent::Unpack { iterable, .. } => vec![iterable],
            TraceEvent::BinaryOp { left, right, .. } | TraceEvent::Compare { left, right, .. } => {
                vec![left, right]
            }
            TraceEvent::UnaryOp { operand, .. } => vec![operand],
            TraceEvent::CreateCollection { elements, .. } => elements.iter().collect(),
            TraceEvent::Method { args, .. } => args.iter().collect(),
            TraceEvent::GetAttr { obj, name } => vec![obj, name],
            TraceEvent::SetAttr { obj, name, value } => vec![obj, name, value],
            TraceEvent::IsinstanceCheck { obj, .. } => vec![obj],
            TraceEvent::SymbolicMethod { receiver, args, .. } => {
                receiver.iter().chain(args.iter()).collect()
            }
        }
    }

    /// The branch condition, if this is a [`TraceEvent::Fork`].
    #[must_use]
    pub fn fork_condition(&self) -> Option<&SymbolicHandle> {
        match self {
            TraceEvent::Fork { cond } => Some(cond),
            _ => None,
        }
    }

    /// Compares everything except operand handles.
    ///
    /// Operand counts are covered by [`matches`](Self::matches).
    #[must_use]
    pub fn same_header(&self, other: &TraceEvent) -> bool {
        match (self, other) {
            (
                TraceEvent::NextInstruction { instruction, code },
                TraceEvent::NextInstruction {
                    instruction: other_instruction,
                    code: other_code,
                },
            ) => instruction == other_instruction && code == other_code,
            (
                TraceEvent::LoadConst { constant },
                TraceEvent::LoadConst {
                    constant: other_constant,
                },
            ) => constant == other_constant,
            (TraceEvent::Fork { .. }, TraceEvent::Fork { .. })
            | (TraceEvent::GetAttr { .. }, TraceEvent::GetAttr { .. })
            | (TraceEvent::SetAttr { .. }, TraceEvent::SetAttr { .. }) => true,
            (
                TraceEvent::Unpack { count, .. },
                TraceEvent::Unpack {
                    count: other_count, ..
                },
            ) => count == other_count,
            (
                TraceEvent::BinaryOp { op, kind, .. },
                TraceEvent::BinaryOp {
                    op: other_op,
                    kind: other_kind,
                    ..
                },
            ) => op == other_op && kind == other_kind,
            (
                TraceEvent::UnaryOp { op, kind, .. },
                TraceEvent::UnaryOp {
                    op: other_op,
                    kind: other_kind,
                    ..
                },
            ) => op == other_op && kind == other_kind,
            (
                TraceEvent::Compare { op, kind, .. },
                TraceEvent::Compare {
                    op: other_op,
                    kind: other_kind,
                    ..
                },
            ) => op == other_op && kind == other_kind,
            (
                TraceEvent::CreateCollection { kind, .. },
                TraceEvent::CreateCollection {
                    kind: other_kind, ..
                },
            ) => kind == other_kind,
            (
                TraceEvent::Method { name, .. },
                TraceEvent::Method {
                    name: other_name, ..
                },
            ) => name == other_name,
            (TraceEvent::FunctionCall { code }, TraceEvent::FunctionCall { code: other_code })
            | (TraceEvent::Return { code }, TraceEvent::Return { code: other_code }) => {
                code == other_code
            }
            (
                TraceEvent::IsinstanceCheck { type_ref, .. },
                TraceEvent::IsinstanceCheck {
                    type_ref: other_type,
                    ..
                },
            )
            | (
                TraceEvent::EmptyObjectCreation { type_ref },
                TraceEvent::EmptyObjectCreation {
                    type_ref: other_type,
                },
            ) => type_ref == other_type,
            (
                TraceEvent::SymbolicMethod {
                    method, receiver, ..
                },
                TraceEvent::SymbolicMethod {
                    method: other_method,
                    receiver: other_receiver,
                    ..
                },
            ) => method == other_method && receiver.is_some() == other_receiver.is_some(),
            _ => false,
        }
    }

    /// Returns `true` if `other` replays this event.
    ///
    /// `compatible` decides whether two operand handles denote the same value.
    pub fn matches<F>(&self, other: &TraceEvent, mut compatible: F) -> bool
    where
        F: FnMut(&SymbolicHandle, &SymbolicHandle) -> bool,
    {
        if !self.same_header(other) {
            return false;
        }
        let ours = self.operands();
        let theirs = other.operands();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(left, right)| compatible(left, right))
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.label())?;
        match self {
            TraceEvent::NextInstruction { instruction, code } => write!(f, "{instruction}, {code}")?,
            TraceEvent::LoadConst { constant } => write!(f, "{constant}")?,
            TraceEvent::FunctionCall { code } | TraceEvent::Return { code } => {
                write!(f, "{code}")?;
            }
            TraceEvent::EmptyObjectCreation { type_ref } => write!(f, "{type_ref}")?,
            TraceEvent::Unpack { iterable, count } => write!(f, "{iterable}, {count}")?,
            TraceEvent::IsinstanceCheck { obj, type_ref } => write!(f, "{obj}, {type_ref}")?,
            other => {
                for (index, operand) in other.operands().into_iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{operand}")?;
                }
            }
        }
        write!(f, ")")
    }
}

/// Identity-based handle compatibility.
///
/// Two purely concrete handles are compatible (concrete identities differ
/// between runs); two symbolic handles are compatible when they carry the same
/// symbol; a symbolic and a concrete handle never are.
#[must_use]
pub fn handles_compatible(left: &SymbolicHandle, right: &SymbolicHandle) -> bool {
    match (left.symbol(), right.symbol()) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;
    use crate::ids::SymbolId;

    fn sym(id: u64) -> SymbolicHandle {
        SymbolicHandle::symbolic(ObjectRef(0x100 + id), SymbolId(id))
    }

    fn add(left: u64, right: u64) -> TraceEvent {
        TraceEvent::BinaryOp {
            op: BinaryOperator::Add,
            kind: NumericKind::Long,
            left: sym(left),
            right: sym(right),
        }
    }

    /// One representative event per kind.
    fn sample(kind: EventKind) -> TraceEvent {
        match kind {
            EventKind::NextInstruction => TraceEvent::NextInstruction {
                instruction: InstructionId(1),
                code: ObjectRef(1),
            },
            EventKind::LoadConst => TraceEvent::LoadConst {
                constant: ObjectRef(2),
            },
            EventKind::Fork => TraceEvent::Fork { cond: sym(1) },
            EventKind::Unpack => TraceEvent::Unpack {
                iterable: sym(1),
                count: 2,
            },
            EventKind::BinaryOp => add(1, 2),
            EventKind::UnaryOp => TraceEvent::UnaryOp {
                op: UnaryOperator::Neg,
                kind: NumericKind::Long,
                operand: sym(1),
            },
            EventKind::Compare => TraceEvent::Compare {
                op: CompareOp::Gt,
                kind: NumericKind::Float,
                left: sym(1),
                right: sym(2),
            },
            EventKind::CreateCollection => TraceEvent::CreateCollection {
                kind: CollectionKind::Tuple,
                elements: vec![sym(1), sym(2)],
            },
            EventKind::Method => TraceEvent::Method {
                name: MethodName::ListGetItem,
                args: vec![sym(1), sym(2)],
            },
            EventKind::GetAttr => TraceEvent::GetAttr {
                obj: sym(1),
                name: sym(2),
            },
            EventKind::SetAttr => TraceEvent::SetAttr {
                obj: sym(1),
                name: sym(2),
                value: sym(3),
            },
            EventKind::FunctionCall => TraceEvent::FunctionCall { code: ObjectRef(3) },
            EventKind::Return => TraceEvent::Return { code: ObjectRef(3) },
            EventKind::IsinstanceCheck => TraceEvent::IsinstanceCheck {
                obj: sym(1),
                type_ref: ObjectRef(4),
            },
            EventKind::EmptyObjectCreation => TraceEvent::EmptyObjectCreation {
                type_ref: ObjectRef(4),
            },
            EventKind::SymbolicMethod => TraceEvent::SymbolicMethod {
                method: SymbolicMethodId::ListAppend,
                receiver: Some(sym(1)),
                args: vec![sym(2)],
            },
        }
    }

    #[test]
    fn test_every_kind_round_trips_through_kind() {
        assert_eq!(EventKind::iter().count(), EventKind::COUNT);
        for kind in EventKind::iter() {
            let event = sample(kind);
            assert_eq!(event.kind(), kind);
            assert!(event.matches(&event.clone(), handles_compatible));
        }
    }

    #[test]
    fn test_kinds_never_match_each_other() {
        for left in EventKind::iter() {
            for right in EventKind::iter().filter(|k| *k != left) {
                assert!(!sample(left).matches(&sample(right), |_, _| true));
            }
        }
    }

    #[test]
    fn test_operator_mismatch() {
        let sub = TraceEvent::BinaryOp {
            op: BinaryOperator::Sub,
            kind: NumericKind::Long,
            left: sym(1),
            right: sym(2),
        };

        assert!(!add(1, 2).matches(&sub, handles_compatible));
        assert!(!add(1, 2).matches(&add(1, 3), handles_compatible));
        assert!(add(1, 2).matches(&add(1, 3), |_, _| true));
    }

    #[test]
    fn test_concrete_handles_are_compatible() {
        let a = SymbolicHandle::concrete(ObjectRef(1));
        let b = SymbolicHandle::concrete(ObjectRef(2));

        assert!(handles_compatible(&a, &b));
        assert!(!handles_compatible(&a, &sym(1)));
    }

    #[test]
    fn test_collection_length_is_part_of_the_match() {
        let short = TraceEvent::CreateCollection {
            kind: CollectionKind::List,
            elements: vec![sym(1)],
        };
        let long = TraceEvent::CreateCollection {
            kind: CollectionKind::List,
            elements: vec![sym(1), sym(2)],
        };

        assert!(!short.matches(&long, handles_compatible));
    }

    #[test]
    fn test_labels() {
        assert_eq!(add(1, 2).label(), "add_long");
        assert_eq!(sample(EventKind::Compare).label(), "gt_float");
        assert_eq!(sample(EventKind::CreateCollection).label(), "create_tuple");
        assert_eq!(sample(EventKind::Method).label(), "list_get_item");
        assert_eq!(sample(EventKind::Fork).label(), "fork");
        assert_eq!(
            sample(EventKind::SymbolicMethod).label(),
            "symbolic_method_list_append"
        );
        assert_eq!(
            add(1, 2).to_string(),
            "add_long(sym1:obj@0x101, sym2:obj@0x102)"
        );
    }

    #[test]
    fn test_compare_from_raw() {
        assert_eq!(CompareOp::from_raw(4), Some(CompareOp::Gt));
        assert_eq!(CompareOp::from_raw(6), None);
        assert_eq!(
            CompareOp::iter().collect::<Vec<_>>(),
            (0..6).filter_map(CompareOp::from_raw).collect::<Vec<_>>()
        );
    }
}
