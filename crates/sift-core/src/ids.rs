//! Identifier generation
//!
//! Each id category keeps its own counter, so rule ids and any other category never
//! collide and each grows by one per generated id. The generator is an explicit value
//! owned by a `RuleBase` (or by the caller), which keeps ids deterministic in tests.

use crate::constants::rules::RULE_ID_CATEGORY;
use std::collections::HashMap;
use std::fmt;

/// Identity of a rule, e.g. `r-1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-category monotonically increasing counters
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    counters: HashMap<String, u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id in `category`, formatted as `<category><n>` starting at 1
    pub fn next(&mut self, category: &str) -> String {
        let counter = self.counters.entry(category.to_string()).or_insert(0);
        *counter += 1;
        format!("{category}{counter}")
    }

    pub fn next_rule_id(&mut self) -> RuleId {
        RuleId(self.next(RULE_ID_CATEGORY))
    }

    /// Number of ids generated so far in `category`
    pub fn issued(&self, category: &str) -> u64 {
        self.counters.get(category).copied().unwrap_or(0)
    }
}
