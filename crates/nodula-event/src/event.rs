//! Event: a named, priority-ordered set of weakly held subscribers.
//!
//! # Dispatch
//!
//! [`Event::trigger`] runs synchronously on the caller's stack:
//!
//! 1. bound positionals ++ call positionals, bound keywords overlaid by
//!    call keywords
//! 2. snapshot the registered priorities, ascending
//! 3. per priority: snapshot the handles, purging dead ones, then invoke
//!    each still-alive subscriber with the same composed arguments
//!
//! The registry lock is never held while a subscriber runs, so a
//! subscriber may register, unregister or trigger (this event included).
//! Changes made during a dispatch only affect priorities whose pass has
//! not started yet.
//!
//! # Failure
//!
//! The first subscriber error stops the dispatch and is returned as
//! [`EventError::SubscriberFailed`]. There is no isolation between
//! subscribers.

use crate::subscriber::{AsSubscriber, Handle};
use crate::{Arguments, EventError};
use nodula_types::{Priority, PriorityScheme};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A named event with bound arguments and prioritized subscribers.
///
/// # Example
///
/// ```
/// use nodula_event::{subscriber, Arguments, Event};
/// use nodula_types::Priority;
/// use serde_json::json;
///
/// let ev = Event::new("saved").bind_arg("doc-1");
/// let cb = subscriber(|args| {
///     assert_eq!(args.positional(), &[json!("doc-1"), json!(42)]);
///     Ok(())
/// });
/// ev.register_at(&cb, Priority::PRE_DISPATCH);
/// ev.trigger(Arguments::new().arg(42)).unwrap();
/// ```
pub struct Event {
    name: String,
    bound: Arguments,
    subscribers: Mutex<BTreeMap<Priority, Vec<Handle>>>,
}

impl Event {
    /// Creates an event without bound arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_bound(name, Arguments::new())
    }

    /// Creates an event whose triggers always carry `bound`.
    #[must_use]
    pub fn with_bound(name: impl Into<String>, bound: Arguments) -> Self {
        Self {
            name: name.into(),
            bound,
            subscribers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Appends a bound positional argument.
    #[must_use]
    pub fn bind_arg(mut self, value: impl Into<Value>) -> Self {
        self.bound = self.bound.arg(value);
        self
    }

    /// Sets a bound keyword argument.
    #[must_use]
    pub fn bind_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bound = self.bound.kwarg(key, value);
        self
    }

    /// Diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments composed into every trigger.
    #[must_use]
    pub fn bound(&self) -> &Arguments {
        &self.bound
    }

    /// Registers at [`Priority::DEFAULT`].
    pub fn register(&self, subscriber: &impl AsSubscriber) {
        self.register_at(subscriber, Priority::DEFAULT);
    }

    /// Registers `subscriber` at `priority` without taking ownership.
    ///
    /// Registering again at the same priority is a no-op; at another
    /// priority it adds an independent subscription.
    pub fn register_at(&self, subscriber: &impl AsSubscriber, priority: Priority) {
        let addr = subscriber.addr();
        let mut subs = self.subscribers.lock();
        let set = subs.entry(priority).or_default();
        self.purge_set(priority, set);

        if set.iter().any(|h| h.points_to(addr)) {
            tracing::trace!(event = %self.name, %priority, "subscriber already registered");
            return;
        }
        set.push(subscriber.downgrade());
        tracing::trace!(event = %self.name, %priority, count = set.len(), "registered subscriber");
    }

    /// Registers at a qualified priority name such as `"UI_HIGH"` or
    /// `"PRE_DISPATCH"`, resolved through `scheme`.
    ///
    /// # Errors
    ///
    /// [`EventError::Priority`] if the name does not resolve; nothing is
    /// registered in that case.
    pub fn register_named(
        &self,
        subscriber: &impl AsSubscriber,
        scheme: &PriorityScheme,
        qualified: &str,
    ) -> Result<Priority, EventError> {
        let priority = scheme.resolve_qualified(qualified)?;
        self.register_at(subscriber, priority);
        Ok(priority)
    }

    /// Removes `subscriber` from every priority.
    ///
    /// Returns the number of subscriptions removed; zero is not an error.
    pub fn unregister(&self, subscriber: &impl AsSubscriber) -> usize {
        let addr = subscriber.addr();
        let mut subs = self.subscribers.lock();
        let mut removed = 0;
        for (&priority, set) in subs.iter_mut() {
            self.purge_set(priority, set);
            let before = set.len();
            set.retain(|h| !h.points_to(addr));
            removed += before - set.len();
        }
        subs.retain(|_, set| !set.is_empty());

        tracing::trace!(event = %self.name, removed, "unregistered subscriber");
        removed
    }

    /// Removes `subscriber` from `priority` only.
    ///
    /// Returns `true` if it was registered there.
    pub fn unregister_at(&self, subscriber: &impl AsSubscriber, priority: Priority) -> bool {
        let addr = subscriber.addr();
        let mut subs = self.subscribers.lock();
        let Some(set) = subs.get_mut(&priority) else {
            return false;
        };

        self.purge_set(priority, set);
        let before = set.len();
        set.retain(|h| !h.points_to(addr));
        let removed = set.len() < before;
        if set.is_empty() {
            subs.remove(&priority);
        }

        tracing::trace!(event = %self.name, %priority, removed, "unregistered subscriber");
        removed
    }

    /// Invokes every live subscriber in ascending priority order.
    ///
    /// `args` is composed with the bound arguments once; every subscriber
    /// of this call sees the same composed [`Arguments`].
    ///
    /// # Errors
    ///
    /// [`EventError::SubscriberFailed`] from the first failing subscriber.
    /// Subscribers after it (same or later priorities) are not invoked.
    pub fn trigger(&self, args: Arguments) -> Result<(), EventError> {
        let args = Arguments::compose(&self.bound, args);
        let priorities: Vec<Priority> = self.subscribers.lock().keys().copied().collect();

        tracing::trace!(
            event = %self.name,
            priorities = priorities.len(),
            args = args.len(),
            "trigger"
        );

        for priority in priorities {
            for handle in self.snapshot(priority) {
                // Dropped by an earlier subscriber of this dispatch.
                let Some(subscriber) = handle.upgrade() else {
                    continue;
                };

                if let Err(source) = subscriber.on_trigger(&args) {
                    tracing::debug!(
                        event = %self.name,
                        %priority,
                        error = %source,
                        "subscriber failed, aborting dispatch"
                    );
                    return Err(EventError::SubscriberFailed {
                        event: self.name.clone(),
                        priority,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of live subscriptions across all priorities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .values()
            .flatten()
            .filter(|h| h.is_alive())
            .count()
    }

    /// Returns `true` if no live subscription exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Priorities that hold at least one live subscriber, ascending.
    #[must_use]
    pub fn priorities(&self) -> Vec<Priority> {
        self.subscribers
            .lock()
            .iter()
            .filter(|(_, set)| set.iter().any(Handle::is_alive))
            .map(|(&priority, _)| priority)
            .collect()
    }

    /// Returns `true` if `subscriber` is registered at any priority.
    #[must_use]
    pub fn contains(&self, subscriber: &impl AsSubscriber) -> bool {
        let addr = subscriber.addr();
        self.subscribers
            .lock()
            .values()
            .flatten()
            .any(|h| h.points_to(addr))
    }

    /// Eagerly drops every dead handle. Returns how many were removed.
    pub fn purge_dead(&self) -> usize {
        let mut subs = self.subscribers.lock();
        let mut purged = 0;
        for (&priority, set) in subs.iter_mut() {
            purged += self.purge_set(priority, set);
        }
        subs.retain(|_, set| !set.is_empty());
        purged
    }

    /// Copies the handles of `priority`, purging dead ones first.
    fn snapshot(&self, priority: Priority) -> Vec<Handle> {
        let mut subs = self.subscribers.lock();
        let handles = match subs.get_mut(&priority) {
            Some(set) => {
                self.purge_set(priority, set);
                set.clone()
            }
            // Emptied by a re-entrant unregister.
            None => return Vec::new(),
        };
        if handles.is_empty() {
            subs.remove(&priority);
        }
        handles
    }

    fn purge_set(&self, priority: Priority, set: &mut Vec<Handle>) -> usize {
        let before = set.len();
        set.retain(Handle::is_alive);
        let purged = before - set.len();
        if purged > 0 {
            tracing::trace!(event = %self.name, %priority, purged, "purged dead subscribers");
        }
        purged
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .field("subscribers", &self.len())
            .finish()
    }
}
