//! Test utilities for event dispatch.
//!
//! [`Recorder`] is a subscriber that remembers what it received and,
//! when tagged, appends its tag to a shared [`CallLog`] so tests can
//! assert on cross-subscriber ordering.

use crate::{Arguments, Subscriber, SubscriberError};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Ordered log of tags shared between recorders.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Value>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&self, entry: impl Into<Value>) {
        self.0.lock().push(entry.into());
    }

    /// Entries in the order they were pushed.
    #[must_use]
    pub fn entries(&self) -> Vec<Value> {
        self.0.lock().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns `true` if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A recording subscriber.
///
/// Every call stores the received [`Arguments`]. A tagged recorder also
/// pushes its tag to the shared log; a failing recorder returns an error
/// after recording.
pub struct Recorder {
    tag: Option<(Value, CallLog)>,
    fail_with: Option<String>,
    received: Mutex<Vec<Arguments>>,
}

impl Recorder {
    /// Creates a recorder that only records.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tag: None,
            fail_with: None,
            received: Mutex::new(Vec::new()),
        })
    }

    /// Creates a recorder that also logs `tag` on every call.
    #[must_use]
    pub fn tagged(tag: impl Into<Value>, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            tag: Some((tag.into(), log.clone())),
            fail_with: None,
            received: Mutex::new(Vec::new()),
        })
    }

    /// Creates a tagged recorder that fails with `message` on every call.
    #[must_use]
    pub fn failing(tag: impl Into<Value>, log: &CallLog, message: &str) -> Arc<Self> {
        Arc::new(Self {
            tag: Some((tag.into(), log.clone())),
            fail_with: Some(message.to_string()),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Number of times this recorder was invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.received.lock().len()
    }

    /// All received arguments, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<Arguments> {
        self.received.lock().clone()
    }

    /// Most recently received arguments.
    #[must_use]
    pub fn last(&self) -> Option<Arguments> {
        self.received.lock().last().cloned()
    }
}

impl Subscriber for Recorder {
    fn on_trigger(&self, args: &Arguments) -> Result<(), SubscriberError> {
        self.received.lock().push(args.clone());
        if let Some((tag, log)) = &self.tag {
            log.push(tag.clone());
        }
        match &self.fail_with {
            Some(message) => Err(SubscriberError::new(message.as_str())),
            None => Ok(()),
        }
    }
}
