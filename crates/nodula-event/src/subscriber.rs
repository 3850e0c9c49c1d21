//! Subscriber trait and weak subscriber handles.
//!
//! An [`Event`](crate::Event) never owns its subscribers. The owner keeps
//! the subscriber in an `Arc`; the event stores a `Weak`. Once the last
//! `Arc` is dropped the handle is dead: dispatch skips it and the next
//! access to its priority purges it.

use crate::{Arguments, EventError};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// A callback invoked when an event is triggered.
///
/// Implemented for every `Fn(&Arguments) -> Result<(), SubscriberError>`
/// closure, so most callers never implement it by hand.
///
/// # Thread Safety
///
/// Subscribers must be `Send + Sync` so events can be shared between
/// threads, even though dispatch itself is synchronous.
pub trait Subscriber: Send + Sync {
    /// Handles one trigger.
    ///
    /// Returning an error aborts the remaining dispatch of that trigger.
    fn on_trigger(&self, args: &Arguments) -> Result<(), SubscriberError>;
}

impl<F> Subscriber for F
where
    F: Fn(&Arguments) -> Result<(), SubscriberError> + Send + Sync,
{
    fn on_trigger(&self, args: &Arguments) -> Result<(), SubscriberError> {
        self(args)
    }
}

/// Wraps a closure into a shared subscriber.
///
/// Pins the closure signature so argument types need no annotation.
///
/// ```
/// use nodula_event::{subscriber, Arguments, Event};
///
/// let ev = Event::new("tick");
/// let cb = subscriber(|args| {
///     assert_eq!(args.len(), 0);
///     Ok(())
/// });
/// ev.register(&cb);
/// ev.trigger(Arguments::new()).unwrap();
/// ```
pub fn subscriber<F>(f: F) -> Arc<F>
where
    F: Fn(&Arguments) -> Result<(), SubscriberError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Error returned from a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubscriberError {
    message: String,
}

impl SubscriberError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for SubscriberError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for SubscriberError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Lets a meta-event subscriber `?` a nested trigger.
impl From<EventError> for SubscriberError {
    fn from(err: EventError) -> Self {
        Self::new(err.to_string())
    }
}

/// Shared pointers that can be registered on an event.
///
/// Implemented for `Arc<S>` of any concrete subscriber and for
/// `Arc<dyn Subscriber>`.
pub trait AsSubscriber {
    /// Creates the non-owning handle stored by the event.
    fn downgrade(&self) -> Handle;

    /// Address identifying the subscriber allocation.
    fn addr(&self) -> *const ();
}

impl<S: Subscriber + 'static> AsSubscriber for Arc<S> {
    fn downgrade(&self) -> Handle {
        let weak: Weak<S> = Arc::downgrade(self);
        Handle(weak)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(self).cast()
    }
}

impl AsSubscriber for Arc<dyn Subscriber> {
    fn downgrade(&self) -> Handle {
        Handle(Arc::downgrade(self))
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(self).cast()
    }
}

/// Non-owning reference to a subscriber.
///
/// The handle keeps the allocation (not the subscriber) alive, so its
/// address stays unique for as long as the handle exists.
#[derive(Clone)]
pub struct Handle(Weak<dyn Subscriber>);

impl Handle {
    /// Returns `true` while the owner still holds the subscriber.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Temporarily takes a strong reference for invocation.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<dyn Subscriber>> {
        self.0.upgrade()
    }

    /// Returns `true` if this handle refers to the allocation at `addr`.
    #[must_use]
    pub fn points_to(&self, addr: *const ()) -> bool {
        std::ptr::eq(self.0.as_ptr().cast::<()>(), addr)
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("addr", &self.0.as_ptr().cast::<()>())
            .field("alive", &self.is_alive())
            .finish()
    }
}
