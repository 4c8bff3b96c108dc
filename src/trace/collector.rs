//! Per-run coverage recorder.
//!
//! The [`TraceCollector`] is a dumb recorder: the bridge feeds it instruction
//! and static field ids, and the harness reads a [`Trace`] snapshot and calls
//! [`clear`](TraceCollector::clear) between runs. It never resets itself.

use crate::{
    ids::{FieldId, InstructionId},
    utils::LongHashSet,
};

/// Records which instructions ran and which static fields were touched.
///
/// A collector is lent `&mut` to exactly one run context at a time, so two
/// runs can never interleave their coverage.
#[derive(Debug, Default)]
pub struct TraceCollector {
    instructions: LongHashSet,
    static_fields: LongHashSet,
}

impl TraceCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` executed. Duplicates are ignored.
    pub fn record_instruction(&mut self, id: InstructionId) {
        self.instructions.add(id.key());
    }

    /// Records an access to the static field `id`. Duplicates are ignored.
    pub fn record_static_field_access(&mut self, id: FieldId) {
        self.static_fields.add(id.key());
    }

    /// Returns `true` if `id` was recorded since the last clear.
    #[must_use]
    pub fn covers(&self, id: InstructionId) -> bool {
        self.instructions.contains(id.key())
    }

    /// Returns `true` if the static field `id` was recorded since the last clear.
    #[must_use]
    pub fn accessed(&self, id: FieldId) -> bool {
        self.static_fields.contains(id.key())
    }

    /// The recorded instruction set.
    #[must_use]
    pub fn instructions(&self) -> &LongHashSet {
        &self.instructions
    }

    /// The recorded static field set.
    #[must_use]
    pub fn static_fields(&self) -> &LongHashSet {
        &self.static_fields
    }

    /// Forgets everything recorded so far. Storage is kept for the next run.
    pub fn clear(&mut self) {
        self.instructions.clear();
        self.static_fields.clear();
    }

    /// Copies the current coverage into an owned [`Trace`].
    #[must_use]
    pub fn trace(&self) -> Trace {
        Trace {
            instructions: self.instructions.clone(),
            static_fields: self.static_fields.clone(),
        }
    }
}

/// Coverage of a single concrete run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    instructions: LongHashSet,
    static_fields: LongHashSet,
}

impl Trace {
    /// Number of distinct instructions covered.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Number of distinct static fields accessed.
    #[must_use]
    pub fn static_field_count(&self) -> usize {
        self.static_fields.len()
    }

    /// Returns `true` if `id` was covered.
    #[must_use]
    pub fn covers(&self, id: InstructionId) -> bool {
        self.instructions.contains(id.key())
    }

    /// Returns `true` if the static field `id` was accessed.
    #[must_use]
    pub fn accessed(&self, id: FieldId) -> bool {
        self.static_fields.contains(id.key())
    }

    /// Covered instruction ids in ascending order.
    #[must_use]
    pub fn instructions(&self) -> Vec<InstructionId> {
        to_ids(&self.instructions, InstructionId::new)
    }

    /// Accessed static field ids in ascending order.
    #[must_use]
    pub fn static_fields(&self) -> Vec<FieldId> {
        to_ids(&self.static_fields, FieldId::new)
    }

    /// Instructions covered by this run that `baseline` has not seen.
    #[must_use]
    pub fn new_coverage(&self, baseline: &LongHashSet) -> Vec<InstructionId> {
        self.instructions()
            .into_iter()
            .filter(|id| !baseline.contains(id.key()))
            .collect()
    }

    /// Adds this run's instructions to `baseline`.
    ///
    /// Returns the number of instructions `baseline` did not contain before.
    pub fn merge_into(&self, baseline: &mut LongHashSet) -> usize {
        self.instructions
            .iter()
            .filter(|&key| baseline.add(key))
            .count()
    }
}

fn to_ids<T>(set: &LongHashSet, make: fn(u32) -> T) -> Vec<T> {
    set.to_sorted_vec()
        .into_iter()
        .filter_map(|key| u32::try_from(key).ok())
        .map(make)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let mut collector = TraceCollector::new();

        collector.record_instruction(InstructionId(5));
        collector.record_instruction(InstructionId(5));
        collector.record_instruction(InstructionId(7));

        assert_eq!(collector.instructions().to_sorted_vec(), vec![5, 7]);
        assert_eq!(collector.instructions().len(), 2);

        collector.clear();
        assert!(!collector.covers(InstructionId(5)));
    }

    #[test]
    fn test_static_fields_are_separate() {
        let mut collector = TraceCollector::new();

        collector.record_static_field_access(FieldId(5));

        assert!(collector.accessed(FieldId(5)));
        assert!(!collector.covers(InstructionId(5)));
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let mut collector = TraceCollector::new();
        collector.record_instruction(InstructionId(1));
        collector.record_static_field_access(FieldId(9));

        let trace = collector.trace();
        collector.clear();

        assert!(trace.covers(InstructionId(1)));
        assert_eq!(trace.static_fields(), vec![FieldId(9)]);
        assert_eq!(collector.trace().instruction_count(), 0);
    }

    #[test]
    fn test_coverage_delta() {
        let mut collector = TraceCollector::new();
        for id in [1, 2, 3] {
            collector.record_instruction(InstructionId(id));
        }
        let trace = collector.trace();

        let mut baseline: LongHashSet = [2].into_iter().collect();

        assert_eq!(
            trace.new_coverage(&baseline),
            vec![InstructionId(1), InstructionId(3)]
        );
        assert_eq!(trace.merge_into(&mut baseline), 2);
        assert_eq!(trace.merge_into(&mut baseline), 0);
    }
}
