//! Declarative transition rules over a 3x3 neighbourhood.
//!
//! A rule's condition is an expression over two families of variables:
//!
//! - `n00` .. `n22`: raw cell values of the window, `n{row}{col}`, with
//!   `n11` the cell itself;
//! - `s0` .. `s{N-1}`: how many of the 8 surrounding cells hold each state
//!   (the centre never counts as its own neighbour).
//!
//! ```
//! use cella_automata::Rule;
//!
//! // Conway survival: alive with 2 or 3 live neighbours.
//! let mut rule = Rule::new("n11 == 1 && (s1 == 2 || s1 == 3)", 1, 2);
//! rule.set_neighbourhood(&[[1, 1, 0], [0, 1, 0], [0, 0, 0]]);
//! assert!(rule.evaluate().unwrap());
//! ```

use crate::{AutomatonError, Cell, Neighbourhood};
use cella_expr::{Expr, FunctionRegistry, ParseError, Scope, std_registry};
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

/// Number of raw neighbour slots (`n00` .. `n22`).
pub const NEIGHBOUR_SLOTS: usize = 9;

static STD_REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(std_registry);

/// Variable layout for rule conditions: slots `0..9` are `n00..n22`
/// (`3 * row + col`), slots `9..9 + num_states` are `s0..s{N-1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighbourhoodScope {
    num_states: usize,
}

impl NeighbourhoodScope {
    /// Creates the scope for an automaton with `num_states` states.
    pub fn new(num_states: usize) -> Self {
        Self { num_states }
    }

    /// Total number of binding slots.
    pub fn slot_count(&self) -> usize {
        NEIGHBOUR_SLOTS + self.num_states
    }
}

impl Scope for NeighbourhoodScope {
    fn slot(&self, name: &str) -> Option<usize> {
        if let Some(rc) = name.strip_prefix('n') {
            let &[r @ b'0'..=b'2', c @ b'0'..=b'2'] = rc.as_bytes() else {
                return None;
            };
            return Some(3 * (r - b'0') as usize + (c - b'0') as usize);
        }
        let digits = name.strip_prefix('s')?;
        let state: usize = digits.parse().ok()?;
        // Rejects "s01", "s+1" and friends.
        (state < self.num_states && state.to_string() == digits)
            .then_some(NEIGHBOUR_SLOTS + state)
    }
}

/// A condition plus the state a cell adopts when the condition holds.
///
/// The condition is compiled once at construction. Cloning a rule shares the
/// compiled expression and copies only the binding array, so each worker of
/// a parallel step can own its clone.
#[derive(Debug, Clone)]
pub struct Rule {
    condition: String,
    expr: Result<Arc<Expr>, ParseError>,
    target: Cell,
    num_states: usize,
    bindings: Vec<i64>,
}

impl Rule {
    /// Creates a rule using the standard function registry.
    ///
    /// A condition that fails to parse does not fail construction; the parse
    /// error is reported by every call to [`Rule::evaluate`]. Use
    /// [`Rule::try_new`] to surface it immediately.
    pub fn new(condition: impl Into<String>, target: Cell, num_states: usize) -> Self {
        Self::with_registry(condition, target, num_states, &STD_REGISTRY)
    }

    /// Creates a rule whose condition may call functions from `registry`.
    pub fn with_registry(
        condition: impl Into<String>,
        target: Cell,
        num_states: usize,
        registry: &FunctionRegistry,
    ) -> Self {
        let condition = condition.into();
        let scope = NeighbourhoodScope::new(num_states);
        let expr = Expr::parse(&condition, &scope, registry).map(Arc::new);
        match &expr {
            Ok(_) => trace!(%condition, target_state = target, "compiled rule"),
            Err(e) => debug!(%condition, error = %e, "rule condition does not parse"),
        }
        Self {
            condition,
            expr,
            target,
            num_states,
            bindings: vec![0; scope.slot_count()],
        }
    }

    /// Creates a rule, failing if the condition does not parse.
    pub fn try_new(
        condition: impl Into<String>,
        target: Cell,
        num_states: usize,
    ) -> Result<Self, AutomatonError> {
        let rule = Self::new(condition, target, num_states);
        match rule.compile_error() {
            Some(e) => Err(AutomatonError::InvalidCondition {
                condition: rule.condition.clone(),
                source: e.clone(),
            }),
            None => Ok(rule),
        }
    }

    /// Returns the condition text.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Returns the state adopted when the condition holds.
    pub fn target_state(&self) -> Cell {
        self.target
    }

    /// Returns the number of states the variable set was built for.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Returns the parse error, if the condition did not compile.
    pub fn compile_error(&self) -> Option<&ParseError> {
        self.expr.as_ref().err()
    }

    /// Current binding values, laid out as in [`NeighbourhoodScope`].
    pub fn bindings(&self) -> &[i64] {
        &self.bindings
    }

    /// Current value of a named variable (`n12`, `s0`, ...).
    pub fn binding(&self, name: &str) -> Option<i64> {
        NeighbourhoodScope::new(self.num_states)
            .slot(name)
            .map(|slot| self.bindings[slot])
    }

    /// Binds the variables to `window`.
    ///
    /// Counts cover the 8 cells around the centre. Values with no count
    /// variable (`>= num_states`, e.g. from a caller-written border) still
    /// appear in the raw `n` slots.
    pub fn set_neighbourhood(&mut self, window: &Neighbourhood) {
        let (raw, counts) = self.bindings.split_at_mut(NEIGHBOUR_SLOTS);
        counts.fill(0);
        for (slot, &state) in raw.iter_mut().zip(window.iter().flatten()) {
            *slot = i64::from(state);
            if let Some(count) = counts.get_mut(usize::from(state)) {
                *count += 1;
            }
        }
        if let Some(count) = counts.get_mut(usize::from(window[1][1])) {
            *count -= 1;
        }
    }

    /// Evaluates the condition against the current bindings.
    pub fn evaluate(&self) -> Result<bool, AutomatonError> {
        let expr = self
            .expr
            .as_ref()
            .map_err(|e| AutomatonError::InvalidCondition {
                condition: self.condition.clone(),
                source: e.clone(),
            })?;
        expr.eval_bool(&self.bindings)
            .map_err(|source| AutomatonError::Evaluation {
                condition: self.condition.clone(),
                source,
            })
    }

    /// Binds `window` and evaluates in one call.
    pub fn matches(&mut self, window: &Neighbourhood) -> Result<bool, AutomatonError> {
        self.set_neighbourhood(window);
        self.evaluate()
    }
}
