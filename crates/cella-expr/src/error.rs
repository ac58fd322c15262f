//! Expression error types.

use crate::ValueType;
use thiserror::Error;

/// Errors raised while parsing an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that starts no token.
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),

    /// Input ended where more was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A token in a position the grammar does not allow.
    #[error("unexpected token: '{0}'")]
    UnexpectedToken(String),

    /// Identifier not present in the scope.
    #[error("unknown variable: '{0}'")]
    UnknownVariable(String),

    /// Function name not present in the registry.
    #[error("unknown function: '{0}'")]
    UnknownFunction(String),

    /// Function called with the wrong number of arguments.
    #[error("function '{func}' expects {expected} args, got {got}")]
    WrongArgCount {
        /// Function name.
        func: String,
        /// Declared arity.
        expected: usize,
        /// Arguments supplied.
        got: usize,
    },

    /// Integer literal that does not fit an `i64`.
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),

    /// Nesting or tree height beyond the given limit.
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Errors raised while evaluating a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Operand of the wrong type for an operator.
    #[error("type error in '{op}': expected {expected}, got {got}")]
    TypeMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Type the operator required.
        expected: ValueType,
        /// Type that was supplied.
        got: ValueType,
    },

    /// Integer division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A predicate produced an integer instead of a boolean.
    #[error("expression did not return a boolean (got {0})")]
    NotBoolean(i64),

    /// The binding slice is shorter than the scope the expression was parsed with.
    #[error("variable slot {slot} out of range for {len} bindings")]
    SlotOutOfRange {
        /// Requested slot.
        slot: usize,
        /// Number of bindings supplied.
        len: usize,
    },
}
