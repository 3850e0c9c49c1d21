//! Priority-ordered synchronous event dispatch.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  nodula-types : Priority, PriorityScheme, ErrorCode          │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  nodula-event : Event, Subscriber, Arguments       ◄── HERE │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Overview
//!
//! An [`Event`] is a named observer list. Subscribers are registered at a
//! [`Priority`](nodula_types::Priority) and invoked in ascending priority
//! order when the event is triggered. Arguments bound at construction are
//! composed with call-site arguments on every trigger.
//!
//! ## Weak subscribers
//!
//! Events hold subscribers weakly. The owner keeps the `Arc`; when it is
//! dropped the subscription disappears on its own, with no explicit
//! unregister needed. A subscriber that nobody else holds is never called.
//!
//! ## Meta-events
//!
//! [`Priority::PRE_DISPATCH`](nodula_types::Priority::PRE_DISPATCH) runs
//! before every block level. A subscriber there can trigger other events,
//! which complete before the enclosing event's normal subscribers run.
//!
//! # Example
//!
//! ```
//! use nodula_event::{subscriber, Arguments, Event};
//! use nodula_types::Priority;
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let ev = Event::new("key").bind_arg("editor");
//!
//! let log = Arc::clone(&seen);
//! let cb = subscriber(move |args| {
//!     log.lock().unwrap().push(args.positional().to_vec());
//!     Ok(())
//! });
//! ev.register_at(&cb, Priority::DEFAULT);
//!
//! ev.trigger(Arguments::new().arg("a")).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![vec![json!("editor"), json!("a")]]);
//!
//! drop(cb);
//! ev.trigger(Arguments::new().arg("b")).unwrap();
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

mod args;
mod error;
mod event;
pub mod subscriber;

pub use args::Arguments;
pub use error::EventError;
pub use event::Event;
pub use subscriber::{subscriber, AsSubscriber, Subscriber, SubscriberError};

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
