//! Trigger arguments: positional and keyword values passed to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Positional and keyword values handed to every subscriber.
///
/// The same type carries an event's *bound* arguments and the call-site
/// arguments of a trigger; [`Arguments::compose`] merges the two.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Map<String, Value>,
}

impl Arguments {
    /// Creates empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword value, replacing any previous value for `key`.
    #[must_use]
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(key.into(), value.into());
        self
    }

    /// Bound positionals first, then call positionals; call keywords
    /// override bound keywords on collision.
    #[must_use]
    pub fn compose(bound: &Self, call: Self) -> Self {
        if bound.is_empty() {
            return call;
        }

        let mut positional = Vec::with_capacity(bound.positional.len() + call.positional.len());
        positional.extend(bound.positional.iter().cloned());
        positional.extend(call.positional);

        let mut keyword = bound.keyword.clone();
        keyword.extend(call.keyword);

        Self {
            positional,
            keyword,
        }
    }

    /// Positional values in order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword values.
    #[must_use]
    pub fn keyword(&self) -> &Map<String, Value> {
        &self.keyword
    }

    /// Positional value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword value for `key`.
    #[must_use]
    pub fn kwarg_value(&self, key: &str) -> Option<&Value> {
        self.keyword.get(key)
    }

    /// Total number of positional and keyword values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Returns `true` if there are no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: Map::new(),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(keyword: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            keyword,
        }
    }
}
