//! Automaton error types.

use crate::Cell;
use cella_expr::{EvalError, ParseError};
use thiserror::Error;

/// Errors that can occur while building or stepping an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Grid width or height is zero.
    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A deserialized grid buffer does not hold `(width + 2) * (height + 2)` cells.
    #[error("grid buffer holds {got} cells, expected {expected}")]
    BufferLengthMismatch {
        /// Length implied by the dimensions.
        expected: usize,
        /// Length supplied.
        got: usize,
    },

    /// Fewer than two states, or more than a [`Cell`] can hold.
    #[error("invalid number of states: {0} (need 2..={max})", max = crate::MAX_STATES)]
    InvalidStateCount(usize),

    /// A grid does not match the automaton's dimensions.
    #[error("grid is {got_width}x{got_height}, automaton is {width}x{height}")]
    GridSizeMismatch {
        /// Automaton width.
        width: usize,
        /// Automaton height.
        height: usize,
        /// Grid width.
        got_width: usize,
        /// Grid height.
        got_height: usize,
    },

    /// A rule was built for a different number of states.
    #[error("rule '{condition}' built for {got} states, automaton has {expected}")]
    RuleStateMismatch {
        /// Rule condition text.
        condition: String,
        /// Automaton state count.
        expected: usize,
        /// Rule state count.
        got: usize,
    },

    /// A rule targets a state the automaton does not have.
    #[error("rule '{condition}' targets state {target}, automaton has {num_states} states")]
    TargetStateOutOfRange {
        /// Rule condition text.
        condition: String,
        /// Rule target state.
        target: Cell,
        /// Automaton state count.
        num_states: usize,
    },

    /// A cell of the current grid holds a state outside `[0, num_states)`.
    #[error("cell ({x}, {y}) holds state {state}, automaton has {num_states} states")]
    StateOutOfRange {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Offending value.
        state: Cell,
        /// Automaton state count.
        num_states: usize,
    },

    /// The rule condition could not be parsed.
    #[error("invalid condition '{condition}': {source}")]
    InvalidCondition {
        /// Rule condition text.
        condition: String,
        /// Parser error.
        source: ParseError,
    },

    /// The rule condition failed to evaluate to a boolean.
    #[error("condition '{condition}' failed: {source}")]
    Evaluation {
        /// Rule condition text.
        condition: String,
        /// Evaluator error.
        source: EvalError,
    },

    /// A generation pass aborted on a rule failure. The next grid is invalid.
    #[error("step failed at cell ({x}, {y}), rule {rule}: {source}")]
    StepFailed {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Index of the failing rule.
        rule: usize,
        /// Underlying rule error.
        source: Box<AutomatonError>,
    },
}
