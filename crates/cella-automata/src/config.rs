//! Automaton configuration.

use crate::Cell;
use crate::presets;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How [`Automaton::run`](crate::Automaton::run) refreshes the border ring
/// of the current grid before each generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Boundary {
    /// Leave the border as the caller wrote it.
    #[default]
    Fixed,
    /// Wrap around: borders mirror the opposite edges.
    Toroidal,
    /// Every border cell holds the given state.
    Constant(Cell),
}

/// One rule: a condition and the state adopted when it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleConfig {
    /// Predicate over `n00..n22` and `s0..s{N-1}`.
    pub condition: String,
    /// Target state.
    pub target: Cell,
}

impl RuleConfig {
    /// Creates a rule config.
    pub fn new(condition: impl Into<String>, target: Cell) -> Self {
        Self {
            condition: condition.into(),
            target,
        }
    }
}

/// Configuration for building an [`Automaton`](crate::Automaton).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutomatonConfig {
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// Number of cell states (at least 2).
    pub num_states: usize,
    /// Border handling used by `run`.
    pub boundary: Boundary,
    /// Rules in priority order; the first match wins.
    pub rules: Vec<RuleConfig>,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self::life(64, 64)
    }
}

impl AutomatonConfig {
    /// Conway's Game of Life on a torus.
    pub fn life(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            num_states: 2,
            boundary: Boundary::Toroidal,
            rules: presets::life_like_conditions(&[3], &[2, 3]),
        }
    }

    /// Sets the boundary.
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_life() {
        let config = AutomatonConfig::default();
        assert_eq!(config.width, 64);
        assert_eq!(config.num_states, 2);
        assert_eq!(config.boundary, Boundary::Toroidal);
        assert_eq!(config.rules.len(), 3);
        assert_eq!(config.rules[2], RuleConfig::new("true", 0));
    }

    #[test]
    fn test_with_boundary() {
        let config = AutomatonConfig::life(8, 8).with_boundary(Boundary::Constant(0));
        assert_eq!(config.boundary, Boundary::Constant(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial() {
        let json = r#"{
            "width": 5,
            "height": 4,
            "num_states": 3,
            "rules": [{ "condition": "n11 == 2", "target": 0 }]
        }"#;
        let config: AutomatonConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.width, 5);
        assert_eq!(config.num_states, 3);
        assert_eq!(config.boundary, Boundary::Toroidal);
        assert_eq!(config.rules, vec![RuleConfig::new("n11 == 2", 0)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let config = AutomatonConfig::life(10, 12).with_boundary(Boundary::Constant(1));
        let json = serde_json::to_string(&config).unwrap();
        let back: AutomatonConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
