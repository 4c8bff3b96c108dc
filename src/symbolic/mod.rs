//! The symbolic boundary: handles and collaborator capabilities.
//!
//! - [`SymbolicHandle`] - Concrete object plus optional symbol
//! - [`SymbolicEngine`] - Forking, evaluation and model bookkeeping
//! - [`TargetRuntime`] - Re-entry into the target interpreter

mod engine;
mod handle;

pub use engine::{SymbolicEngine, TargetRuntime};
pub use handle::SymbolicHandle;
