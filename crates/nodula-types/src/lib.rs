//! Core types for nodula event dispatch.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  nodula-types : Priority, Level, PriorityScheme,   ◄── HERE │
//! │                 SchemeConfig, ErrorCode                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  nodula-event : Event, Subscriber, Arguments                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate is the leaf of the workspace. The event layer only needs
//! [`Priority`] as an ordered key; everything about *how* priorities are
//! named and allocated lives here.
//!
//! # Priorities
//!
//! - [`Priority::PRE_DISPATCH`] (0) runs before everything else.
//! - The built-in `EVENT` block covers 1..=5; [`Priority::DEFAULT`] is its
//!   `NORMAL` level.
//! - [`PriorityScheme::register_block`] appends further five-level blocks.
//!
//! # Example
//!
//! ```
//! use nodula_types::{Level, Priority, PriorityScheme};
//!
//! let scheme = PriorityScheme::new();
//! scheme.register_block("RENDER").unwrap();
//!
//! let late = scheme.resolve_level("RENDER", Level::Low).unwrap();
//! assert!(late > Priority::DEFAULT);
//! ```

mod config;
mod error;
mod priority;

pub use config::SchemeConfig;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use priority::{
    Level, Priority, PriorityBlock, PriorityError, PriorityScheme, BLOCK_SIZE, EVENT_BLOCK,
    PRE_DISPATCH_NAME,
};
