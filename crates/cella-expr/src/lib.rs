//! Expression language for cellular-automaton rule conditions.
//!
//! Conditions are parsed once into an [`Ast`] with every variable resolved to
//! a binding slot, then evaluated many times against a plain `&[i64]` slice.
//! All functions are registered via the [`ExprFn`] trait.
//!
//! # Syntax
//!
//! ```text
//! // Operators (precedence low to high)
//! a || b                          // logical or (short-circuit)
//! a && b                          // logical and (short-circuit)
//! a == b, a != b                  // equality, ints or bools
//! a < b, a <= b, a > b, a >= b    // ordering, ints
//! a + b, a - b                    // wrapping integer arithmetic
//! a * b, a / b, a % b             // division by zero is an error
//! -a, !a                          // negation, logical not
//!
//! // Literals
//! 42, true, false
//!
//! // Functions (registered via ExprFn)
//! min(a, b), max(a, b), abs(a), sign(a), clamp(x, lo, hi)
//! ```
//!
//! # Example
//!
//! ```
//! use cella_expr::{Expr, std_registry};
//!
//! let scope = ["alive", "neighbours"];
//! let expr = Expr::parse("alive == 1 && (neighbours == 2 || neighbours == 3)", &scope, &std_registry())
//!     .unwrap();
//! assert!(expr.eval_bool(&[1, 3]).unwrap());
//! assert!(!expr.eval_bool(&[1, 4]).unwrap());
//! ```

mod error;
mod parse;
mod registry;

pub use error::{EvalError, ParseError};
pub use parse::{Ast, BinOp, Func, MAX_DEPTH, UnaryOp};
pub use registry::{
    ExprFn, FnAbs, FnClamp, FnMax, FnMin, FnSign, FunctionRegistry, std_registry,
};

use parse::Parser;
use std::collections::HashMap;

// ============================================================================
// Values
// ============================================================================

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Type of this value.
    pub fn value_type(self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
        }
    }
}

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Bool,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Bool => write!(f, "bool"),
        }
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Maps variable names to binding slots at parse time.
pub trait Scope {
    /// Slot for `name`, or `None` if the variable is undefined.
    fn slot(&self, name: &str) -> Option<usize>;
}

impl Scope for HashMap<String, usize> {
    fn slot(&self, name: &str) -> Option<usize> {
        self.get(name).copied()
    }
}

impl Scope for [&str] {
    fn slot(&self, name: &str) -> Option<usize> {
        self.iter().position(|n| *n == name)
    }
}

impl<const N: usize> Scope for [&str; N] {
    fn slot(&self, name: &str) -> Option<usize> {
        self.as_slice().slot(name)
    }
}

impl Scope for Vec<String> {
    fn slot(&self, name: &str) -> Option<usize> {
        self.iter().position(|n| n == name)
    }
}

// ============================================================================
// Expression
// ============================================================================

/// A compiled expression that can be evaluated.
#[derive(Debug, Clone)]
pub struct Expr {
    ast: Ast,
}

impl Expr {
    /// Parses an expression, resolving variables through `scope` and
    /// functions through `registry`.
    pub fn parse<S: Scope + ?Sized>(
        input: &str,
        scope: &S,
        registry: &FunctionRegistry,
    ) -> Result<Self, ParseError> {
        let ast = Parser::new(input, scope, registry)?.parse_all()?;
        Ok(Self { ast })
    }

    /// Returns the parsed AST.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Evaluates the expression against slot bindings.
    pub fn eval(&self, vars: &[i64]) -> Result<Value, EvalError> {
        eval_ast(&self.ast, vars)
    }

    /// Evaluates the expression as a predicate.
    ///
    /// An integer result is an [`EvalError::NotBoolean`], never coerced.
    pub fn eval_bool(&self, vars: &[i64]) -> Result<bool, EvalError> {
        match self.eval(vars)? {
            Value::Bool(b) => Ok(b),
            Value::Int(n) => Err(EvalError::NotBoolean(n)),
        }
    }
}

fn expect_int(v: Value, op: &'static str) -> Result<i64, EvalError> {
    match v {
        Value::Int(n) => Ok(n),
        Value::Bool(_) => Err(EvalError::TypeMismatch {
            op,
            expected: ValueType::Int,
            got: ValueType::Bool,
        }),
    }
}

fn expect_bool(v: Value, op: &'static str) -> Result<bool, EvalError> {
    match v {
        Value::Bool(b) => Ok(b),
        Value::Int(_) => Err(EvalError::TypeMismatch {
            op,
            expected: ValueType::Bool,
            got: ValueType::Int,
        }),
    }
}

fn eval_ast(ast: &Ast, vars: &[i64]) -> Result<Value, EvalError> {
    match ast {
        Ast::Int(n) => Ok(Value::Int(*n)),
        Ast::Bool(b) => Ok(Value::Bool(*b)),
        Ast::Var(slot) => vars
            .get(*slot)
            .map(|v| Value::Int(*v))
            .ok_or(EvalError::SlotOutOfRange {
                slot: *slot,
                len: vars.len(),
            }),
        Ast::UnaryOp(op, inner) => {
            let v = eval_ast(inner, vars)?;
            Ok(match op {
                UnaryOp::Neg => Value::Int(expect_int(v, op.symbol())?.wrapping_neg()),
                UnaryOp::Not => Value::Bool(!expect_bool(v, op.symbol())?),
            })
        }
        Ast::BinOp(op @ (BinOp::And | BinOp::Or), l, r) => {
            let l = expect_bool(eval_ast(l, vars)?, op.symbol())?;
            // Short-circuit: the right side is not evaluated once the result is known.
            if l == (*op == BinOp::Or) {
                return Ok(Value::Bool(l));
            }
            Ok(Value::Bool(expect_bool(eval_ast(r, vars)?, op.symbol())?))
        }
        Ast::BinOp(op @ (BinOp::Eq | BinOp::Ne), l, r) => {
            let l = eval_ast(l, vars)?;
            let r = eval_ast(r, vars)?;
            if l.value_type() != r.value_type() {
                return Err(EvalError::TypeMismatch {
                    op: op.symbol(),
                    expected: l.value_type(),
                    got: r.value_type(),
                });
            }
            Ok(Value::Bool((l == r) == (*op == BinOp::Eq)))
        }
        Ast::BinOp(op, l, r) => {
            let sym = op.symbol();
            let l = expect_int(eval_ast(l, vars)?, sym)?;
            let r = expect_int(eval_ast(r, vars)?, sym)?;
            Ok(match op {
                BinOp::Lt => Value::Bool(l < r),
                BinOp::Le => Value::Bool(l <= r),
                BinOp::Gt => Value::Bool(l > r),
                BinOp::Ge => Value::Bool(l >= r),
                BinOp::Add => Value::Int(l.wrapping_add(r)),
                BinOp::Sub => Value::Int(l.wrapping_sub(r)),
                BinOp::Mul => Value::Int(l.wrapping_mul(r)),
                BinOp::Div | BinOp::Rem if r == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Div => Value::Int(l.wrapping_div(r)),
                BinOp::Rem => Value::Int(l.wrapping_rem(r)),
                BinOp::And | BinOp::Or | BinOp::Eq | BinOp::Ne => unreachable!(),
            })
        }
        Ast::Call(func, args) => {
            let values: Vec<i64> = args
                .iter()
                .map(|a| eval_ast(a, vars).and_then(|v| expect_int(v, "call")))
                .collect::<Result<_, _>>()?;
            Ok(Value::Int(func.call(&values)))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: [&str; 3] = ["x", "y", "z"];

    fn eval(expr: &str, vars: &[i64]) -> Value {
        Expr::parse(expr, &SCOPE, &std_registry())
            .unwrap()
            .eval(vars)
            .unwrap()
    }

    fn eval_err(expr: &str, vars: &[i64]) -> EvalError {
        Expr::parse(expr, &SCOPE, &std_registry())
            .unwrap()
            .eval(vars)
            .unwrap_err()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(eval("42", &[]), Value::Int(42));
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(eval("y", &[1, 2, 3]), Value::Int(2));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4", &[]), Value::Int(14));
        assert_eq!(eval("(2 + 3) * 4", &[]), Value::Int(20));
        assert_eq!(eval("10 - 4 - 3", &[]), Value::Int(3));
        assert_eq!(eval("7 % 4 + 1", &[]), Value::Int(4));
    }

    #[test]
    fn test_negation() {
        assert_eq!(eval("-5", &[]), Value::Int(-5));
        assert_eq!(eval("--5", &[]), Value::Int(5));
        assert_eq!(eval("!true", &[]), Value::Bool(false));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("x < y", &[1, 2, 0]), Value::Bool(true));
        assert_eq!(eval("x >= y", &[1, 2, 0]), Value::Bool(false));
        assert_eq!(eval("x != y", &[1, 2, 0]), Value::Bool(true));
        assert_eq!(eval("0 == 0", &[]), Value::Bool(true));
        assert_eq!(eval("true == false", &[]), Value::Bool(false));
    }

    #[test]
    fn test_logical() {
        assert_eq!(
            eval("x == 1 && (y == 2 || y == 3)", &[1, 3, 0]),
            Value::Bool(true)
        );
        assert_eq!(eval("x == 0 && y == 3", &[1, 3, 0]), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        // Right side would divide by zero.
        assert_eq!(eval("false && 1 / 0 == 1", &[]), Value::Bool(false));
        assert_eq!(eval("true || 1 / 0 == 1", &[]), Value::Bool(true));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("min(3, 7)", &[]), Value::Int(3));
        assert_eq!(eval("max(x, z)", &[3, 0, 7]), Value::Int(7));
        assert_eq!(eval("abs(-4)", &[]), Value::Int(4));
        assert_eq!(eval("clamp(9, 0, 5)", &[]), Value::Int(5));
        assert_eq!(eval("sign(x)", &[-8, 0, 0]), Value::Int(-1));
    }

    #[test]
    fn test_eval_bool_rejects_int() {
        let expr = Expr::parse("1 + 1", &SCOPE, &std_registry()).unwrap();
        assert_eq!(expr.eval_bool(&[]), Err(EvalError::NotBoolean(2)));
    }

    #[test]
    fn test_type_mismatch() {
        assert!(matches!(
            eval_err("1 && true", &[]),
            EvalError::TypeMismatch { op: "&&", .. }
        ));
        assert!(matches!(
            eval_err("true + 1", &[]),
            EvalError::TypeMismatch { op: "+", .. }
        ));
        assert!(matches!(
            eval_err("1 == true", &[]),
            EvalError::TypeMismatch {
                expected: ValueType::Int,
                got: ValueType::Bool,
                ..
            }
        ));
        assert!(matches!(
            eval_err("min(true, 1)", &[]),
            EvalError::TypeMismatch { op: "call", .. }
        ));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_err("x / 0", &[1, 0, 0]), EvalError::DivisionByZero);
        assert_eq!(eval_err("x % y", &[1, 0, 0]), EvalError::DivisionByZero);
    }

    #[test]
    fn test_slot_out_of_range() {
        assert_eq!(
            eval_err("z", &[1]),
            EvalError::SlotOutOfRange { slot: 2, len: 1 }
        );
    }

    #[test]
    fn test_hashmap_scope() {
        let scope: HashMap<String, usize> = [("count".to_string(), 0)].into();
        let expr = Expr::parse("count > 2", &scope, &std_registry()).unwrap();
        assert!(expr.eval_bool(&[3]).unwrap());
    }

    #[test]
    fn test_custom_function() {
        struct Double;
        impl ExprFn for Double {
            fn name(&self) -> &str {
                "double"
            }
            fn arg_count(&self) -> usize {
                1
            }
            fn call(&self, args: &[i64]) -> i64 {
                args[0] * 2
            }
        }

        let mut registry = std_registry();
        registry.register(Double);

        let expr = Expr::parse("double(x)", &SCOPE, &registry).unwrap();
        assert_eq!(expr.eval(&[5]).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_deeply_nested_input_is_an_error() {
        let input = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(
            Expr::parse(&input, &["a"], &std_registry()).unwrap_err(),
            ParseError::TooDeep(MAX_DEPTH)
        );
    }

    #[test]
    fn test_eval_at_max_depth() {
        let input = format!("{}x", "-".repeat(MAX_DEPTH - 1));
        let expr = Expr::parse(&input, &SCOPE, &std_registry()).unwrap();
        assert_eq!(expr.eval(&[7, 0, 0]).unwrap(), Value::Int(-7));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        let max = i64::MAX.to_string();
        assert_eq!(eval(&format!("{max} + 1"), &[]), Value::Int(i64::MIN));
    }
}
