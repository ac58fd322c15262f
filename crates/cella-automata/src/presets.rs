//! Common rule sets.
//!
//! Life-like rules are written as birth/survival neighbour counts (e.g.
//! B3/S23 for Game of Life) and expanded into ordered conditions: survival,
//! then birth, then a catch-all that kills every other cell.

use crate::config::RuleConfig;
use crate::{Cell, Rule};

/// Game of Life (B3/S23).
pub const LIFE: (&[u8], &[u8]) = (&[3], &[2, 3]);

/// HighLife (B36/S23).
pub const HIGH_LIFE: (&[u8], &[u8]) = (&[3, 6], &[2, 3]);

/// Seeds (B2/S): every live cell dies each generation.
pub const SEEDS: (&[u8], &[u8]) = (&[2], &[]);

/// Day & Night (B3678/S34678).
pub const DAY_NIGHT: (&[u8], &[u8]) = (&[3, 6, 7, 8], &[3, 4, 6, 7, 8]);

fn any_count(counts: &[u8]) -> String {
    counts
        .iter()
        .map(|n| format!("s1 == {n}"))
        .collect::<Vec<_>>()
        .join(" || ")
}

/// Ordered two-state rule configs for a birth/survival rule.
pub fn life_like_conditions(birth: &[u8], survive: &[u8]) -> Vec<RuleConfig> {
    let mut rules = Vec::with_capacity(3);
    if !survive.is_empty() {
        rules.push(RuleConfig::new(
            format!("n11 == 1 && ({})", any_count(survive)),
            1,
        ));
    }
    if !birth.is_empty() {
        rules.push(RuleConfig::new(
            format!("n11 == 0 && ({})", any_count(birth)),
            1,
        ));
    }
    rules.push(RuleConfig::new("true", 0));
    rules
}

/// Compiles ordered rule configs for `num_states` states.
pub fn compile(configs: &[RuleConfig], num_states: usize) -> Vec<Rule> {
    configs
        .iter()
        .map(|c| Rule::new(c.condition.as_str(), c.target, num_states))
        .collect()
}

/// Two-state rules for a birth/survival rule.
pub fn life_like(birth: &[u8], survive: &[u8]) -> Vec<Rule> {
    compile(&life_like_conditions(birth, survive), 2)
}

/// Conway's Game of Life.
pub fn game_of_life() -> Vec<Rule> {
    life_like(LIFE.0, LIFE.1)
}

/// HighLife.
pub fn high_life() -> Vec<Rule> {
    life_like(HIGH_LIFE.0, HIGH_LIFE.1)
}

/// Seeds.
pub fn seeds() -> Vec<Rule> {
    life_like(SEEDS.0, SEEDS.1)
}

/// Day & Night.
pub fn day_night() -> Vec<Rule> {
    life_like(DAY_NIGHT.0, DAY_NIGHT.1)
}

/// Rules that map every state to itself.
///
/// States past [`MAX_STATES`](crate::MAX_STATES) get no rule.
pub fn identity(num_states: usize) -> Vec<Rule> {
    (0..=Cell::MAX)
        .take(num_states)
        .map(|k| Rule::new(format!("n11 == {k}"), k, num_states))
        .collect()
}

/// Cyclic rule: a cell in state `k` advances to `k + 1` (mod `num_states`)
/// when at least `threshold` neighbours already hold `k + 1`.
///
/// Transitions into a state past [`MAX_STATES`](crate::MAX_STATES) are left out.
pub fn cyclic(num_states: usize, threshold: u8) -> Vec<Rule> {
    (0..=Cell::MAX)
        .take(num_states)
        .filter_map(|k| {
            let next = Cell::try_from((usize::from(k) + 1) % num_states).ok()?;
            Some(Rule::new(
                format!("n11 == {k} && s{next} >= {threshold}"),
                next,
                num_states,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_STATES;

    #[test]
    fn test_targets_never_wrap_past_cell_range() {
        let rules = identity(300);
        assert_eq!(rules.len(), MAX_STATES);
        for (k, rule) in rules.iter().enumerate() {
            assert_eq!(usize::from(rule.target_state()), k);
        }

        let rules = cyclic(300, 1);
        assert_eq!(rules.len(), MAX_STATES - 1);
        assert!(rules.iter().all(|r| r.target_state() != 0));
    }

    #[test]
    fn test_life_conditions() {
        let rules = life_like_conditions(&[3], &[2, 3]);
        assert_eq!(
            rules,
            vec![
                RuleConfig::new("n11 == 1 && (s1 == 2 || s1 == 3)", 1),
                RuleConfig::new("n11 == 0 && (s1 == 3)", 1),
                RuleConfig::new("true", 0),
            ]
        );
    }

    #[test]
    fn test_empty_survival_is_skipped() {
        let rules = life_like_conditions(SEEDS.0, SEEDS.1);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].condition, "n11 == 0 && (s1 == 2)");
    }

    #[test]
    fn test_presets_compile() {
        for rules in [game_of_life(), high_life(), seeds(), day_night()] {
            assert!(rules.iter().all(|r| r.compile_error().is_none()));
        }
        for rules in [identity(4), cyclic(4, 1)] {
            assert_eq!(rules.len(), 4);
            assert!(rules.iter().all(|r| r.compile_error().is_none()));
        }
    }

    #[test]
    fn test_cyclic_advances() {
        let mut rules = cyclic(3, 1);
        let window = [[0, 0, 0], [0, 2, 0], [0, 0, 0]];
        // State 2 advances to 0 with eight 0-neighbours.
        assert!(rules[2].matches(&window).unwrap());
        assert_eq!(rules[2].target_state(), 0);
        assert!(!rules[0].matches(&window).unwrap());
    }
}
