//! Priority namespace for event dispatch.
//!
//! Priorities are plain integers: lower values dispatch earlier. They are
//! organized into named *blocks* of five consecutive values, one per
//! [`Level`], so independent subsystems can claim their own band without
//! coordinating raw numbers.
//!
//! ```text
//!   0        1 ... 5        6 ... 10       11 ... 15
//! ┌──────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐
//! │ PRE  │ │   EVENT    │ │  block #2  │ │  block #3  │ ...
//! └──────┘ └────────────┘ └────────────┘ └────────────┘
//!  PRE_DISPATCH   VERY_HIGH .. VERY_LOW within each block
//! ```
//!
//! The `EVENT` block is built in. Further blocks are appended in
//! registration order and never removed.
//!
//! # Example
//!
//! ```
//! use nodula_types::{Level, Priority, PriorityScheme};
//!
//! let scheme = PriorityScheme::new();
//! let ui = scheme.register_block("UI").unwrap();
//!
//! assert_eq!(ui.level(Level::VeryHigh), Priority::new(6));
//! assert_eq!(scheme.resolve("UI", "NORMAL").unwrap(), Priority::new(8));
//! assert_eq!(scheme.resolve_qualified("EVENT_NORMAL").unwrap(), Priority::DEFAULT);
//! assert!(Priority::PRE_DISPATCH < ui.level(Level::VeryHigh));
//! ```

use crate::ErrorCode;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Number of priority values per block.
pub const BLOCK_SIZE: u32 = 5;

/// Name of the built-in block every scheme starts with.
pub const EVENT_BLOCK: &str = "EVENT";

/// Qualified name that resolves to [`Priority::PRE_DISPATCH`].
pub const PRE_DISPATCH_NAME: &str = "PRE_DISPATCH";

const EVENT_BLOCK_BASE: u32 = 1;

/// A dispatch priority. Lower values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u32);

impl Priority {
    /// Runs before every block level. Reserved for meta-events that fan
    /// out into other events ahead of normal subscribers.
    pub const PRE_DISPATCH: Self = Self(0);

    /// `EVENT` block, `NORMAL` level.
    pub const DEFAULT: Self = Self(EVENT_BLOCK_BASE + Level::Normal.offset());

    /// Creates a priority from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns `true` for [`Priority::PRE_DISPATCH`].
    #[must_use]
    pub const fn is_pre_dispatch(self) -> bool {
        self.0 == Self::PRE_DISPATCH.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for Priority {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position within a priority block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    /// Offset 0.
    VeryHigh,
    /// Offset 1.
    High,
    /// Offset 2.
    Normal,
    /// Offset 3.
    Low,
    /// Offset 4.
    VeryLow,
}

impl Level {
    /// All levels in dispatch order.
    pub const ALL: [Self; 5] = [
        Self::VeryHigh,
        Self::High,
        Self::Normal,
        Self::Low,
        Self::VeryLow,
    ];

    /// Offset from the owning block's base.
    #[must_use]
    pub const fn offset(self) -> u32 {
        match self {
            Self::VeryHigh => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
            Self::VeryLow => 4,
        }
    }

    /// Canonical symbol, e.g. `"VERY_HIGH"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryHigh => "VERY_HIGH",
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
            Self::VeryLow => "VERY_LOW",
        }
    }

    /// Candidate `(block, level)` splits of `"{BLOCK}_{LEVEL}"`, longest
    /// level suffix first: `"NET_VERY_LOW"` yields `("NET", VeryLow)`,
    /// then `("NET_VERY", Low)`.
    fn split_qualified(name: &str) -> impl Iterator<Item = (&str, Self)> + '_ {
        const LONGEST_FIRST: [Level; 5] = [
            Level::VeryHigh,
            Level::VeryLow,
            Level::Normal,
            Level::High,
            Level::Low,
        ];
        LONGEST_FIRST.into_iter().filter_map(move |level| {
            let block = name.strip_suffix(level.as_str())?.strip_suffix('_')?;
            (!block.is_empty()).then_some((block, level))
        })
    }
}

impl FromStr for Level {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| PriorityError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named band of [`BLOCK_SIZE`] consecutive priorities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PriorityBlock {
    name: String,
    base: Priority,
}

impl PriorityBlock {
    /// Block name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First value of the block (its `VERY_HIGH` level).
    #[must_use]
    pub fn base(&self) -> Priority {
        self.base
    }

    /// Priority of `level` within this block.
    #[must_use]
    pub fn level(&self, level: Level) -> Priority {
        Priority(self.base.0 + level.offset())
    }

    /// Last value of the block (its `VERY_LOW` level).
    #[must_use]
    pub fn last(&self) -> Priority {
        self.level(Level::VeryLow)
    }

    /// Returns `true` if `priority` falls inside this block.
    #[must_use]
    pub fn contains(&self, priority: Priority) -> bool {
        (self.base..=self.last()).contains(&priority)
    }
}

/// Errors from registering or resolving priorities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    /// A block with this name already exists.
    #[error("priority block already registered: {0}")]
    NameConflict(String),

    /// Block names must be non-empty.
    #[error("invalid priority block name: {0:?}")]
    InvalidBlockName(String),

    /// No block with this name has been registered.
    #[error("unknown priority block: {0}")]
    UnknownBlock(String),

    /// Not one of `VERY_HIGH`, `HIGH`, `NORMAL`, `LOW`, `VERY_LOW`.
    #[error("unknown priority level: {0}")]
    UnknownLevel(String),

    /// A qualified name without a recognizable level suffix.
    #[error("unknown priority reference: {0}")]
    UnknownReference(String),

    /// No room left in the `u32` priority range for another block.
    #[error("priority range exhausted, cannot allocate block: {0}")]
    RangeExhausted(String),
}

impl PriorityError {
    /// Returns `true` for the lookup failures (unknown block, level or
    /// qualified reference).
    #[must_use]
    pub fn is_unknown_reference(&self) -> bool {
        matches!(
            self,
            Self::UnknownBlock(_) | Self::UnknownLevel(_) | Self::UnknownReference(_)
        )
    }
}

impl ErrorCode for PriorityError {
    fn code(&self) -> &'static str {
        match self {
            Self::NameConflict(_) => "PRIORITY_NAME_CONFLICT",
            Self::InvalidBlockName(_) => "PRIORITY_INVALID_BLOCK_NAME",
            Self::UnknownBlock(_) => "PRIORITY_UNKNOWN_BLOCK",
            Self::UnknownLevel(_) => "PRIORITY_UNKNOWN_LEVEL",
            Self::UnknownReference(_) => "PRIORITY_UNKNOWN_REFERENCE",
            Self::RangeExhausted(_) => "PRIORITY_RANGE_EXHAUSTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[derive(Debug)]
struct SchemeState {
    /// Allocation order.
    blocks: Vec<PriorityBlock>,
    by_name: HashMap<String, usize>,
    next_base: u32,
}

impl SchemeState {
    fn get(&self, name: &str) -> Option<&PriorityBlock> {
        self.by_name.get(name).map(|&idx| &self.blocks[idx])
    }
}

/// Registry of priority blocks.
///
/// Allocation only grows: a registered block keeps its range for the
/// lifetime of the scheme. Interior-mutable, so a shared reference (see
/// [`PriorityScheme::global`]) is enough to register new blocks.
#[derive(Debug)]
pub struct PriorityScheme {
    state: RwLock<SchemeState>,
}

static GLOBAL_SCHEME: OnceLock<PriorityScheme> = OnceLock::new();

impl PriorityScheme {
    /// Creates a scheme holding only the built-in `EVENT` block.
    #[must_use]
    pub fn new() -> Self {
        let event = PriorityBlock {
            name: EVENT_BLOCK.to_string(),
            base: Priority(EVENT_BLOCK_BASE),
        };
        let mut by_name = HashMap::new();
        by_name.insert(event.name.clone(), 0);

        Self {
            state: RwLock::new(SchemeState {
                blocks: vec![event],
                by_name,
                next_base: EVENT_BLOCK_BASE + BLOCK_SIZE,
            }),
        }
    }

    /// The process-wide scheme, created on first use.
    pub fn global() -> &'static Self {
        GLOBAL_SCHEME.get_or_init(Self::new)
    }

    /// Allocates the next free block and binds it to `name`.
    ///
    /// # Errors
    ///
    /// - [`PriorityError::NameConflict`] if `name` is already bound
    /// - [`PriorityError::InvalidBlockName`] if `name` is empty
    /// - [`PriorityError::RangeExhausted`] if no full block fits below
    ///   `u32::MAX`
    pub fn register_block(&self, name: &str) -> Result<PriorityBlock, PriorityError> {
        if name.is_empty() {
            return Err(PriorityError::InvalidBlockName(name.to_string()));
        }

        let mut state = self.state.write();
        if state.by_name.contains_key(name) {
            return Err(PriorityError::NameConflict(name.to_string()));
        }
        let next_base = state
            .next_base
            .checked_add(BLOCK_SIZE)
            .ok_or_else(|| PriorityError::RangeExhausted(name.to_string()))?;

        let block = PriorityBlock {
            name: name.to_string(),
            base: Priority(state.next_base),
        };
        let idx = state.blocks.len();
        state.blocks.push(block.clone());
        state.by_name.insert(block.name.clone(), idx);
        state.next_base = next_base;

        tracing::debug!(block = name, base = %block.base, "registered priority block");
        Ok(block)
    }

    /// Resolves `level` (a level symbol such as `"NORMAL"`) within `block`.
    ///
    /// # Errors
    ///
    /// [`PriorityError::UnknownBlock`] or [`PriorityError::UnknownLevel`].
    pub fn resolve(&self, block: &str, level: &str) -> Result<Priority, PriorityError> {
        let level = Level::from_str(level)?;
        self.resolve_level(block, level)
    }

    /// Typed form of [`resolve`](Self::resolve).
    ///
    /// # Errors
    ///
    /// [`PriorityError::UnknownBlock`] if `block` was never registered.
    pub fn resolve_level(&self, block: &str, level: Level) -> Result<Priority, PriorityError> {
        self.state
            .read()
            .get(block)
            .map(|b| b.level(level))
            .ok_or_else(|| PriorityError::UnknownBlock(block.to_string()))
    }

    /// Resolves a `"{BLOCK}_{LEVEL}"` name, or `"PRE_DISPATCH"`.
    ///
    /// # Errors
    ///
    /// [`PriorityError::UnknownReference`] when no level suffix matches,
    /// [`PriorityError::UnknownBlock`] when the block part is unknown.
    /// A name like `"NET_VERY_LOW"` first tries block `NET`, then
    /// `NET_VERY`; the error names the first candidate.
    pub fn resolve_qualified(&self, name: &str) -> Result<Priority, PriorityError> {
        if name == PRE_DISPATCH_NAME {
            return Ok(Priority::PRE_DISPATCH);
        }

        let state = self.state.read();
        let mut first_block = None;
        for (block, level) in Level::split_qualified(name) {
            if let Some(found) = state.get(block) {
                return Ok(found.level(level));
            }
            first_block.get_or_insert(block);
        }
        Err(match first_block {
            Some(block) => PriorityError::UnknownBlock(block.to_string()),
            None => PriorityError::UnknownReference(name.to_string()),
        })
    }

    /// Looks up a block by name.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<PriorityBlock> {
        self.state.read().get(name).cloned()
    }

    /// All blocks in allocation order.
    #[must_use]
    pub fn blocks(&self) -> Vec<PriorityBlock> {
        self.state.read().blocks.clone()
    }

    /// Base the next registered block will receive.
    #[must_use]
    pub fn next_base(&self) -> Priority {
        Priority(self.state.read().next_base)
    }
}

impl Default for PriorityScheme {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_codes;

    // ── Constants ────────────────────────────────────────────

    #[test]
    fn pre_dispatch_is_zero() {
        assert_eq!(Priority::PRE_DISPATCH.value(), 0);
        assert!(Priority::PRE_DISPATCH.is_pre_dispatch());
        assert!(!Priority::DEFAULT.is_pre_dispatch());
    }

    #[test]
    fn default_is_event_normal() {
        let scheme = PriorityScheme::new();
        assert_eq!(Priority::DEFAULT.value(), 3);
        assert_eq!(Priority::default(), Priority::DEFAULT);
        assert_eq!(
            scheme.resolve(EVENT_BLOCK, "NORMAL").unwrap(),
            Priority::DEFAULT
        );
    }

    // ── Levels ───────────────────────────────────────────────

    #[test]
    fn level_offsets_are_contiguous() {
        for (i, level) in Level::ALL.into_iter().enumerate() {
            assert_eq!(level.offset(), i as u32);
        }
    }

    #[test]
    fn level_parse_all_symbols() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn level_parse_is_case_sensitive() {
        let err = "normal".parse::<Level>().unwrap_err();
        assert_eq!(err, PriorityError::UnknownLevel("normal".into()));
    }

    #[test]
    fn level_serde_uses_symbols() {
        let json = serde_json::to_string(&Level::VeryHigh).unwrap();
        assert_eq!(json, "\"VERY_HIGH\"");
        let back: Level = serde_json::from_str("\"VERY_LOW\"").unwrap();
        assert_eq!(back, Level::VeryLow);
    }

    // ── Block allocation ─────────────────────────────────────

    #[test]
    fn new_scheme_has_only_event_block() {
        let scheme = PriorityScheme::new();
        let blocks = scheme.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name(), EVENT_BLOCK);
        assert_eq!(blocks[0].base(), Priority::new(1));
        assert_eq!(blocks[0].last(), Priority::new(5));
        assert_eq!(scheme.next_base(), Priority::new(6));
    }

    #[test]
    fn blocks_allocated_contiguously_in_order() {
        let scheme = PriorityScheme::new();
        let a = scheme.register_block("A").unwrap();
        let b = scheme.register_block("B").unwrap();

        assert_eq!(a.base(), Priority::new(6));
        assert_eq!(b.base(), Priority::new(11));
        assert_eq!(scheme.next_base(), Priority::new(16));

        let names: Vec<_> = scheme.blocks().iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, ["EVENT", "A", "B"]);
    }

    #[test]
    fn blocks_never_overlap() {
        let scheme = PriorityScheme::new();
        for name in ["A", "B", "C", "D"] {
            scheme.register_block(name).unwrap();
        }
        let blocks = scheme.blocks();
        for (i, x) in blocks.iter().enumerate() {
            for y in &blocks[i + 1..] {
                assert!(x.last() < y.base(), "{} overlaps {}", x.name(), y.name());
            }
        }
    }

    #[test]
    fn new_block_normal_exceeds_all_previous_values() {
        let scheme = PriorityScheme::new();
        scheme.register_block("EARLIER").unwrap();
        let previous = scheme.blocks();

        scheme.register_block("BLOCK").unwrap();
        let normal = scheme.resolve("BLOCK", "NORMAL").unwrap();

        assert!(normal > Priority::PRE_DISPATCH);
        for block in previous {
            assert!(normal > block.last());
        }
    }

    #[test]
    fn pre_dispatch_below_every_block() {
        let scheme = PriorityScheme::new();
        scheme.register_block("X").unwrap();
        for block in scheme.blocks() {
            assert!(Priority::PRE_DISPATCH < block.level(Level::VeryHigh));
            assert!(!block.contains(Priority::PRE_DISPATCH));
        }
    }

    #[test]
    fn register_duplicate_is_name_conflict() {
        let scheme = PriorityScheme::new();
        scheme.register_block("UI").unwrap();
        let err = scheme.register_block("UI").unwrap_err();
        assert_eq!(err, PriorityError::NameConflict("UI".into()));
        // Cursor did not advance.
        assert_eq!(scheme.next_base(), Priority::new(11));
    }

    #[test]
    fn register_event_block_is_name_conflict() {
        let scheme = PriorityScheme::new();
        assert!(matches!(
            scheme.register_block(EVENT_BLOCK),
            Err(PriorityError::NameConflict(_))
        ));
    }

    #[test]
    fn register_past_range_end_is_exhausted() {
        let scheme = PriorityScheme::new();
        scheme.state.write().next_base = u32::MAX - BLOCK_SIZE;

        let last = scheme.register_block("LAST").unwrap();
        assert_eq!(last.last(), Priority::new(u32::MAX - 1));

        let err = scheme.register_block("OVERFLOW").unwrap_err();
        assert_eq!(err, PriorityError::RangeExhausted("OVERFLOW".into()));
        assert!(scheme.block("OVERFLOW").is_none());
        assert_eq!(scheme.next_base(), Priority::new(u32::MAX));
    }

    #[test]
    fn register_empty_name_rejected() {
        let scheme = PriorityScheme::new();
        assert_eq!(
            scheme.register_block("").unwrap_err(),
            PriorityError::InvalidBlockName(String::new())
        );
    }

    // ── Resolution ───────────────────────────────────────────

    #[test]
    fn resolve_every_level() {
        let scheme = PriorityScheme::new();
        let block = scheme.register_block("NET").unwrap();
        for level in Level::ALL {
            let p = scheme.resolve("NET", level.as_str()).unwrap();
            assert_eq!(p, block.level(level));
            assert!(block.contains(p));
        }
    }

    #[test]
    fn resolve_unknown_block() {
        let scheme = PriorityScheme::new();
        let err = scheme.resolve("NOPE", "NORMAL").unwrap_err();
        assert_eq!(err, PriorityError::UnknownBlock("NOPE".into()));
        assert!(err.is_unknown_reference());
    }

    #[test]
    fn resolve_unknown_level() {
        let scheme = PriorityScheme::new();
        let err = scheme.resolve(EVENT_BLOCK, "MEDIUM").unwrap_err();
        assert_eq!(err, PriorityError::UnknownLevel("MEDIUM".into()));
        assert!(err.is_unknown_reference());
    }

    #[test]
    fn qualified_names() {
        let scheme = PriorityScheme::new();
        scheme.register_block("BLOCK").unwrap();

        assert_eq!(
            scheme.resolve_qualified("PRE_DISPATCH").unwrap(),
            Priority::PRE_DISPATCH
        );
        assert_eq!(
            scheme.resolve_qualified("EVENT_VERY_HIGH").unwrap(),
            Priority::new(1)
        );
        assert_eq!(
            scheme.resolve_qualified("EVENT_HIGH").unwrap(),
            Priority::new(2)
        );
        assert_eq!(
            scheme.resolve_qualified("BLOCK_NORMAL").unwrap(),
            Priority::new(8)
        );
        assert_eq!(
            scheme.resolve_qualified("BLOCK_VERY_LOW").unwrap(),
            Priority::new(10)
        );
    }

    #[test]
    fn qualified_block_names_may_contain_underscores() {
        let scheme = PriorityScheme::new();
        let block = scheme.register_block("MY_NET").unwrap();
        assert_eq!(
            scheme.resolve_qualified("MY_NET_LOW").unwrap(),
            block.level(Level::Low)
        );
    }

    #[test]
    fn qualified_falls_back_to_shorter_level_suffix() {
        let scheme = PriorityScheme::new();
        let block = scheme.register_block("NET_VERY").unwrap();
        assert_eq!(block.base(), Priority::new(6));
        assert_eq!(
            scheme.resolve_qualified("NET_VERY_LOW").unwrap(),
            Priority::new(9)
        );
        assert_eq!(
            scheme.resolve_qualified("NET_VERY_VERY_HIGH").unwrap(),
            Priority::new(6)
        );
    }

    #[test]
    fn qualified_prefers_longest_level_suffix() {
        let scheme = PriorityScheme::new();
        let net = scheme.register_block("NET").unwrap();
        scheme.register_block("NET_VERY").unwrap();
        assert_eq!(
            scheme.resolve_qualified("NET_VERY_LOW").unwrap(),
            net.level(Level::VeryLow)
        );
    }

    #[test]
    fn qualified_unknown_names_first_candidate() {
        let scheme = PriorityScheme::new();
        assert_eq!(
            scheme.resolve_qualified("NET_VERY_LOW").unwrap_err(),
            PriorityError::UnknownBlock("NET".into())
        );
    }

    #[test]
    fn qualified_without_level_suffix() {
        let scheme = PriorityScheme::new();
        for name in ["EVENT", "EVENT_", "_NORMAL", "NORMAL", "EVENT_MEDIUM"] {
            let err = scheme.resolve_qualified(name).unwrap_err();
            assert_eq!(err, PriorityError::UnknownReference(name.into()), "{name}");
        }
    }

    #[test]
    fn qualified_unknown_block() {
        let scheme = PriorityScheme::new();
        assert_eq!(
            scheme.resolve_qualified("GHOST_HIGH").unwrap_err(),
            PriorityError::UnknownBlock("GHOST".into())
        );
    }

    // ── Global scheme ────────────────────────────────────────

    #[test]
    fn global_is_shared() {
        let a = PriorityScheme::global();
        let b = PriorityScheme::global();
        assert!(std::ptr::eq(a, b));

        a.register_block("PRIORITY_RS_GLOBAL_TEST").unwrap();
        assert!(b.block("PRIORITY_RS_GLOBAL_TEST").is_some());
    }

    // ── Errors ───────────────────────────────────────────────

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                PriorityError::NameConflict("x".into()),
                PriorityError::InvalidBlockName("x".into()),
                PriorityError::UnknownBlock("x".into()),
                PriorityError::UnknownLevel("x".into()),
                PriorityError::UnknownReference("x".into()),
                PriorityError::RangeExhausted("x".into()),
            ],
            "PRIORITY_",
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(
            PriorityError::NameConflict("UI".into()).to_string(),
            "priority block already registered: UI"
        );
        assert_eq!(
            PriorityError::UnknownLevel("MEDIUM".into()).to_string(),
            "unknown priority level: MEDIUM"
        );
        assert!(!PriorityError::NameConflict("UI".into()).is_unknown_reference());
    }
}
