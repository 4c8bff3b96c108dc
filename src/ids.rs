//! Identifier newtypes shared by every collector.
//!
//! Instruction, field and call-site ids are dense integers handed out by the
//! instrumentation compiler. Two runs agree on an id only when they were
//! instrumented from the same build; the runtime never assigns them itself.
//!
//! [`ObjectRef`] is the identity of a concrete object inside the target
//! interpreter and [`SymbolId`] names a value in the symbolic engine. Neither
//! is ever dereferenced here.

use std::fmt;

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Creates an id from its raw value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                $name(value)
            }

            /// Returns the raw id value.
            #[must_use]
            pub const fn value(&self) -> u32 {
                self.0
            }

            /// Returns the id as a coverage-set key.
            #[must_use]
            pub const fn key(&self) -> i64 {
                self.0 as i64
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                $name(value)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

dense_id!(
    /// An instrumented code location (bytecode offset within a code object).
    InstructionId,
    "insn"
);

dense_id!(
    /// A static field whose accesses are recorded for coverage.
    FieldId,
    "field"
);

dense_id!(
    /// A call site whose callee may be replaced by a scripted mock.
    CallSiteId,
    "site"
);

/// Identity of a concrete object in the target interpreter.
///
/// Compared by identity only; two structurally equal objects have distinct
/// references.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef(pub u64);

impl ObjectRef {
    /// Returns the raw reference value.
    #[must_use]
    pub const fn address(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj@{:#x}", self.0)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj@{:#x}", self.0)
    }
}

/// Name of a value inside the symbolic engine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u64);

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}
