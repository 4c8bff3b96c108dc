//! # concolic-trace Prelude
//!
//! The types an interpreter binding or an exploration harness needs most
//! often, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all concolic-trace operations
pub use crate::Error;

/// The result type used throughout concolic-trace
pub use crate::Result;

// ================================================================================================
// Runs
// ================================================================================================

/// Run orchestration
pub use crate::concolic::{
    AbortReason, ConcolicRunContext, ConcolicRunner, ForkedState, LimitExceeded, PathPrefix,
    RunPhase, RunReport, RunStatistics, RunVerdict,
};

/// Configuration
pub use crate::concolic::{RunConfig, RunLimits, TracingConfig};

// ================================================================================================
// Events and Slot Operations
// ================================================================================================

/// Traced events and their operators
pub use crate::concolic::{
    BinaryOperator, CollectionKind, CompareOp, EventKind, MethodName, NumericKind,
    SymbolicMethodId, TraceEvent, UnaryOperator,
};

/// Slot operations in flight
pub use crate::concolic::{MockHeader, SlotMethod};

// ================================================================================================
// Collaborators, Identifiers and Collectors
// ================================================================================================

/// Symbolic boundary
pub use crate::symbolic::{SymbolicEngine, SymbolicHandle, TargetRuntime};

/// Identifiers
pub use crate::ids::{CallSiteId, FieldId, InstructionId, ObjectRef, SymbolId};

/// Mocks
pub use crate::mock::{MockEntry, MockReceiver, MockRegistry, Value};

/// Coverage
pub use crate::trace::{Trace, TraceCollector};
