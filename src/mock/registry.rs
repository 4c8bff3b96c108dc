//! Registry of pending mock values.
//!
//! Before a run, the harness scripts one [`MockEntry`] per mocked
//! `(call site, receiver)` pair. During the run every lookup consumes the
//! next queued value of that pair. Lookups never fall back to a default:
//! running out of values is reported as [`Error::MockNotFound`].
//!
//! # Key Space
//!
//! Keys are partitioned by [`MockReceiver`]. A static lookup only ever sees
//! static entries, and an instance lookup compares receivers by object
//! identity. A static mock and an instance mock on the same call site id are
//! distinct keys and never collide.

use std::fmt;

use crate::{
    ids::{CallSiteId, ObjectRef},
    mock::Value,
    utils::AppendVec,
    Error, Result,
};

/// The receiver half of a mock key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockReceiver {
    /// A static method or a global function; matched by call site id alone.
    Static,
    /// A method on a specific object, matched by identity.
    Instance(ObjectRef),
}

impl From<Option<ObjectRef>> for MockReceiver {
    fn from(receiver: Option<ObjectRef>) -> Self {
        receiver.map_or(MockReceiver::Static, MockReceiver::Instance)
    }
}

impl fmt::Display for MockReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockReceiver::Static => write!(f, "static"),
            MockReceiver::Instance(obj) => write!(f, "instance {obj}"),
        }
    }
}

/// A queue of scripted results for one `(call site, receiver)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct MockEntry {
    site: CallSiteId,
    receiver: MockReceiver,
    values: Vec<Value>,
    cursor: usize,
}

impl MockEntry {
    /// Creates an entry handing out `values` in order.
    pub fn new<I, V>(site: CallSiteId, receiver: MockReceiver, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        MockEntry {
            site,
            receiver,
            values: values.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }

    /// Creates a static-method entry.
    pub fn for_static<I, V>(site: CallSiteId, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(site, MockReceiver::Static, values)
    }

    /// Creates an entry bound to the object `receiver`.
    pub fn for_instance<I, V>(site: CallSiteId, receiver: ObjectRef, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(site, MockReceiver::Instance(receiver), values)
    }

    /// The mocked call site.
    #[must_use]
    pub fn site(&self) -> CallSiteId {
        self.site
    }

    /// The receiver this entry answers for.
    #[must_use]
    pub fn receiver(&self) -> MockReceiver {
        self.receiver
    }

    /// Values handed out so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Values still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }

    /// Returns `true` if the entry answers for `site` and `receiver`.
    #[must_use]
    pub fn matches(&self, site: CallSiteId, receiver: MockReceiver) -> bool {
        self.site == site && self.receiver == receiver
    }

    fn take(&mut self) -> Option<Value> {
        let value = self.values.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(value)
    }
}

/// Pending mock values for the current run, consumed in order.
#[derive(Debug, Default)]
pub struct MockRegistry {
    entries: AppendVec<MockEntry>,
    in_execution: bool,
    lookups: u64,
}

macro_rules! typed_accessor {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$meta])*
        ///
        /// # Errors
        ///
        /// Returns [`Error::MockNotFound`] if no value is queued and
        /// [`Error::MockTypeMismatch`] if the next value has another type. A
        /// mismatched value is still consumed.
        pub fn $name(&mut self, site: CallSiteId, receiver: MockReceiver) -> Result<$ty> {
            match self.get_mock_value(site, receiver)? {
                Value::$variant(value) => Ok(value),
                other => Err(Error::MockTypeMismatch {
                    site,
                    expected: Value::$variant(Default::default()).type_name(),
                    found: other.type_name(),
                }),
            }
        }
    };
}

impl MockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` and returns its slot.
    pub fn add_mock(&mut self, entry: MockEntry) -> usize {
        self.entries.push(entry)
    }

    /// Returns the first entry registered for `site` and `receiver`.
    #[must_use]
    pub fn find(&self, site: CallSiteId, receiver: MockReceiver) -> Option<&MockEntry> {
        self.entries.find(|entry| entry.matches(site, receiver))
    }

    /// Returns `true` if any entry was registered for `site` and `receiver`.
    ///
    /// An exhausted entry still counts as mocked; its next lookup fails.
    #[must_use]
    pub fn is_mocked(&self, site: CallSiteId, receiver: MockReceiver) -> bool {
        self.find(site, receiver).is_some()
    }

    /// Values still queued for `site` and `receiver` across all entries.
    #[must_use]
    pub fn pending(&self, site: CallSiteId, receiver: MockReceiver) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.matches(site, receiver))
            .map(MockEntry::remaining)
            .sum()
    }

    /// Consumes the next queued value for `site` and `receiver`.
    ///
    /// Entries registered for the same key are drained in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MockNotFound`] if no entry exists or every matching
    /// entry is exhausted.
    pub fn get_mock_value(&mut self, site: CallSiteId, receiver: MockReceiver) -> Result<Value> {
        self.lookups += 1;

        let mut consumed = 0;
        for index in 0..self.entries.len() {
            let Some(entry) = self.entries.get_mut(index) else {
                break;
            };
            if !entry.matches(site, receiver) {
                continue;
            }
            if let Some(value) = entry.take() {
                return Ok(value);
            }
            consumed += entry.consumed();
        }

        log::debug!("mock lookup for {site} on {receiver} found no value");
        Err(Error::MockNotFound {
            site,
            receiver,
            consumed,
        })
    }

    typed_accessor!(
        /// Consumes the next value as a `bool`.
        get_bool_mock_value, Bool, bool
    );
    typed_accessor!(
        /// Consumes the next value as an `i8`.
        get_byte_mock_value, Byte, i8
    );
    typed_accessor!(
        /// Consumes the next value as an `i16`.
        get_short_mock_value, Short, i16
    );
    typed_accessor!(
        /// Consumes the next value as an `i32`.
        get_int_mock_value, Int, i32
    );
    typed_accessor!(
        /// Consumes the next value as an `i64`.
        get_long_mock_value, Long, i64
    );
    typed_accessor!(
        /// Consumes the next value as an `f32`.
        get_float_mock_value, Float, f32
    );
    typed_accessor!(
        /// Consumes the next value as an `f64`.
        get_double_mock_value, Double, f64
    );
    typed_accessor!(
        /// Consumes the next value as a `char`.
        get_char_mock_value, Char, char
    );

    /// Consumes the next value as an object reference; `Null` yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MockNotFound`] if no value is queued and
    /// [`Error::MockTypeMismatch`] if the next value is a primitive.
    pub fn get_object_mock_value(
        &mut self,
        site: CallSiteId,
        receiver: MockReceiver,
    ) -> Result<Option<ObjectRef>> {
        match self.get_mock_value(site, receiver)? {
            Value::Object(obj) => Ok(Some(obj)),
            Value::Null => Ok(None),
            other => Err(Error::MockTypeMismatch {
                site,
                expected: "object",
                found: other.type_name(),
            }),
        }
    }

    /// Marks the start of the target's execution.
    pub fn begin_execution(&mut self) {
        self.in_execution = true;
    }

    /// Marks the end of the target's execution.
    pub fn end_execution(&mut self) {
        self.in_execution = false;
    }

    /// Returns `true` while the target function is executing.
    ///
    /// Global mocks consult this flag to tell calls made by the target from
    /// calls made while the harness sets up or tears down the run.
    #[must_use]
    pub fn in_execution(&self) -> bool {
        self.in_execution
    }

    /// Number of lookups made since the last clear, including failed ones.
    #[must_use]
    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &MockEntry> {
        self.entries.iter()
    }

    /// Drops every entry. Storage is kept for the next run.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lookups = 0;
    }
}
