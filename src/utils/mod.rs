//! Allocation-aware containers used on the instrumentation hot path.
//!
//! - [`LongHashSet`] - Open-addressing set of `i64` keys with O(1) clear
//! - [`AppendVec`] - Append-only array with 3/2 growth and linear lookup

mod appendvec;
mod longset;

pub use appendvec::AppendVec;
pub use longset::{LongHashSet, LongHashSetIter};
