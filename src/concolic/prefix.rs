//! Read-only cursor over a recorded path.

use crate::{concolic::TraceEvent, ids::SymbolId};

/// The events a run is expected to reproduce before reaching new territory.
///
/// The recorded events are never modified; replay only advances the cursor.
///
/// A prefix handed out with a forked state also carries the symbolic result
/// of every event. The forked state already reflects those events, so replay
/// returns the recorded results instead of stepping the engine again. A prefix
/// built from bare events has no results and is replayed by re-applying each
/// event to the run's initial state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathPrefix {
    events: Vec<TraceEvent>,
    results: Option<Vec<Option<SymbolId>>>,
    cursor: usize,
}

impl PathPrefix {
    /// Creates a prefix that replays `events` in order, re-applying each one.
    #[must_use]
    pub fn new(events: Vec<TraceEvent>) -> Self {
        PathPrefix {
            events,
            results: None,
            cursor: 0,
        }
    }

    /// Creates a prefix whose events already produced `results`.
    ///
    /// `results[i]` is the symbol event `i` yielded; missing trailing results
    /// are treated as `None`.
    #[must_use]
    pub fn recorded(events: Vec<TraceEvent>, results: Vec<Option<SymbolId>>) -> Self {
        PathPrefix {
            events,
            results: Some(results),
            cursor: 0,
        }
    }

    /// An empty prefix; the run explores from its first event.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The next event to be matched, if any remain.
    #[must_use]
    pub fn peek(&self) -> Option<&TraceEvent> {
        self.events.get(self.cursor)
    }

    /// The recorded result of the next event.
    ///
    /// `None` if the prefix carries no results and the event must be
    /// re-applied; `Some(None)` if the event produced no symbol.
    #[must_use]
    pub fn peek_result(&self) -> Option<Option<SymbolId>> {
        self.results
            .as_ref()
            .map(|results| results.get(self.cursor).copied().flatten())
    }

    /// Consumes the next event.
    pub fn advance(&mut self) {
        if self.cursor < self.events.len() {
            self.cursor += 1;
        }
    }

    /// Number of events consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of events left to match.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    /// Total recorded length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns `true` once every recorded event has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.events.len()
    }

    /// Returns `true` if the prefix carries the results of its events.
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// The recorded events.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl From<Vec<TraceEvent>> for PathPrefix {
    fn from(events: Vec<TraceEvent>) -> Self {
        PathPrefix::new(events)
    }
}
