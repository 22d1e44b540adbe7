//! Conditional routing: first-match selection among (condition, target) pairs.
//!
//! [`select`] is the pure form over already-evaluated booleans. A
//! [`ContextSwitch`] embeds routing inside a pipeline: its guards are
//! re-evaluated against the flag store every time the switch is referenced —
//! there is no memoization.

use serde::{Deserialize, Serialize};

use crate::state::MemoryState;

/// Return the target paired with the first true condition, else `fallback`.
pub fn select<'a>(conditions: &[(bool, &'a str)], fallback: &'a str) -> &'a str {
    conditions
        .iter()
        .find(|(condition, _)| *condition)
        .map(|(_, target)| *target)
        .unwrap_or(fallback)
}

/// A routing condition evaluated at selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Guard {
    /// A fixed boolean, decided at construction.
    Literal(bool),
    /// True when the named flag holds a truthy value.
    FlagTruthy(String),
}

impl Guard {
    /// Evaluate against the flag store.
    pub fn evaluate(&self, flags: &MemoryState) -> bool {
        match self {
            Guard::Literal(b) => *b,
            Guard::FlagTruthy(key) => flags.truthy(key),
        }
    }
}

/// First-match conditional selection of a step name, with a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSwitch {
    /// Ordered (guard, target step name) cases.
    pub cases: Vec<(Guard, String)>,
    /// Target when no guard holds.
    pub fallback: String,
}

impl ContextSwitch {
    /// Create a switch.
    pub fn new(cases: Vec<(Guard, String)>, fallback: &str) -> Self {
        Self {
            cases,
            fallback: fallback.to_string(),
        }
    }

    /// Resolve to a step name against the current flags.
    pub fn resolve(&self, flags: &MemoryState) -> &str {
        self.cases
            .iter()
            .find(|(guard, _)| guard.evaluate(flags))
            .map(|(_, target)| target.as_str())
            .unwrap_or(&self.fallback)
    }
}
