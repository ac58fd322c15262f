//! Lexer, AST and recursive-descent parser.

use crate::registry::{ExprFn, FunctionRegistry};
use crate::{ParseError, Scope};
use std::sync::Arc;

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    Comma,
    Eof,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn single(&mut self, token: Token) -> Result<Token, ParseError> {
        self.next_char();
        Ok(token)
    }

    /// Consumes `second` if it follows, choosing between a two-char and a one-char token.
    fn pair(
        &mut self,
        first: char,
        second: char,
        double: Token,
        single: Option<Token>,
    ) -> Result<Token, ParseError> {
        self.next_char();
        if self.peek_char() == Some(second) {
            self.next_char();
            Ok(double)
        } else {
            single.ok_or(ParseError::UnexpectedChar(first))
        }
    }

    fn read_number(&mut self) -> Result<i64, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.next_char();
            } else {
                break;
            }
        }
        let s = &self.input[start..self.pos];
        s.parse()
            .map_err(|_| ParseError::InvalidNumber(s.to_string()))
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        match c {
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '%' => self.single(Token::Percent),
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            ',' => self.single(Token::Comma),
            '&' => self.pair(c, '&', Token::AndAnd, None),
            '|' => self.pair(c, '|', Token::OrOr, None),
            '=' => self.pair(c, '=', Token::EqEq, None),
            '!' => self.pair(c, '=', Token::NotEq, Some(Token::Bang)),
            '<' => self.pair(c, '=', Token::Le, Some(Token::Lt)),
            '>' => self.pair(c, '=', Token::Ge, Some(Token::Gt)),
            '0'..='9' => Ok(Token::Int(self.read_number()?)),
            'a'..='z' | 'A'..='Z' | '_' => Ok(Token::Ident(self.read_ident())),
            _ => Err(ParseError::UnexpectedChar(c)),
        }
    }
}

// ============================================================================
// AST
// ============================================================================

/// AST node for expressions. Variables and functions are already resolved.
#[derive(Debug, Clone)]
pub enum Ast {
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// Variable, by binding slot.
    Var(usize),
    /// Unary operator.
    UnaryOp(UnaryOp, Box<Ast>),
    /// Binary operator.
    BinOp(BinOp, Box<Ast>, Box<Ast>),
    /// Function call.
    Call(Func, Vec<Ast>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    /// Source symbol, used in error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    /// Source symbol, used in error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// A function resolved from a [`FunctionRegistry`].
#[derive(Clone)]
pub struct Func {
    name: String,
    func: Arc<dyn ExprFn>,
}

impl Func {
    /// Name the function was called by.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, args: &[i64]) -> i64 {
        self.func.call(args)
    }
}

impl std::fmt::Debug for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Func").field(&self.name).finish()
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Maximum nesting of parentheses, unary operators and calls, and maximum
/// height of a parsed tree.
pub const MAX_DEPTH: usize = 256;

/// A subtree and its height.
struct Node {
    ast: Ast,
    height: usize,
}

impl Node {
    fn leaf(ast: Ast) -> Self {
        Self { ast, height: 1 }
    }
}

pub(crate) struct Parser<'a, S: Scope + ?Sized> {
    lexer: Lexer<'a>,
    current: Token,
    scope: &'a S,
    registry: &'a FunctionRegistry,
    depth: usize,
}

impl<'a, S: Scope + ?Sized> Parser<'a, S> {
    pub(crate) fn new(
        input: &'a str,
        scope: &'a S,
        registry: &'a FunctionRegistry,
    ) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            scope,
            registry,
            depth: 0,
        })
    }

    /// Parses a full expression and requires the input to be exhausted.
    pub(crate) fn parse_all(&mut self) -> Result<Ast, ParseError> {
        let node = self.parse_or()?;
        if self.current != Token::Eof {
            return Err(self.unexpected());
        }
        Ok(node.ast)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        match &self.current {
            Token::Eof => ParseError::UnexpectedEnd,
            t => ParseError::UnexpectedToken(format!("{:?}", t)),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current == expected {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    /// Wraps `ast` as a node one level above `height`.
    fn branch(ast: Ast, height: usize) -> Result<Node, ParseError> {
        let height = height + 1;
        if height > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        Ok(Node { ast, height })
    }

    /// Runs `f` one nesting level deeper.
    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parses one left-associative precedence level.
    fn parse_level(
        &mut self,
        next: fn(&mut Self) -> Result<Node, ParseError>,
        op_for: fn(&Token) -> Option<BinOp>,
    ) -> Result<Node, ParseError> {
        let mut left = next(self)?;
        while let Some(op) = op_for(&self.current) {
            self.advance()?;
            let right = next(self)?;
            let height = left.height.max(right.height);
            left = Self::branch(
                Ast::BinOp(op, Box::new(left.ast), Box::new(right.ast)),
                height,
            )?;
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_and, |t| match t {
            Token::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_equality, |t| match t {
            Token::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_comparison, |t| match t {
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_add_sub, |t| match t {
            Token::Lt => Some(BinOp::Lt),
            Token::Le => Some(BinOp::Le),
            Token::Gt => Some(BinOp::Gt),
            Token::Ge => Some(BinOp::Ge),
            _ => None,
        })
    }

    fn parse_add_sub(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_mul_div, |t| match t {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_mul_div(&mut self) -> Result<Node, ParseError> {
        self.parse_level(Self::parse_unary, |t| match t {
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Rem),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.current {
            Token::Minus => UnaryOp::Neg,
            Token::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        let inner = self.nested(Self::parse_unary)?;
        Self::branch(Ast::UnaryOp(op, Box::new(inner.ast)), inner.height)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match &self.current {
            Token::Int(n) => {
                let n = *n;
                self.advance()?;
                Ok(Node::leaf(Ast::Int(n)))
            }
            Token::Ident(name) => {
                let name = name.clone();
                self.advance()?;

                if self.current == Token::LParen {
                    self.advance()?;
                    let mut args = Vec::new();
                    if self.current != Token::RParen {
                        args.push(self.nested(Self::parse_or)?);
                        while self.current == Token::Comma {
                            self.advance()?;
                            args.push(self.nested(Self::parse_or)?);
                        }
                    }
                    self.expect(Token::RParen)?;
                    self.resolve_call(name, args)
                } else {
                    let ast = match name.as_str() {
                        "true" => Ast::Bool(true),
                        "false" => Ast::Bool(false),
                        _ => self
                            .scope
                            .slot(&name)
                            .map(Ast::Var)
                            .ok_or(ParseError::UnknownVariable(name))?,
                    };
                    Ok(Node::leaf(ast))
                }
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.nested(Self::parse_or)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn resolve_call(&self, name: String, args: Vec<Node>) -> Result<Node, ParseError> {
        let func = self
            .registry
            .get(&name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownFunction(name.clone()))?;

        if args.len() != func.arg_count() {
            return Err(ParseError::WrongArgCount {
                expected: func.arg_count(),
                got: args.len(),
                func: name,
            });
        }

        let height = args.iter().map(|a| a.height).max().unwrap_or(0);
        let args = args.into_iter().map(|a| a.ast).collect();
        Self::branch(Ast::Call(Func { name, func }, args), height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::std_registry;

    fn parse(input: &str) -> Result<Ast, ParseError> {
        let scope = ["a", "b"];
        let registry = std_registry();
        Parser::new(input, &scope, &registry)?.parse_all()
    }

    #[test]
    fn test_two_char_operators() {
        let mut lexer = Lexer::new("&& || == != <= >= < > !");
        let mut tokens = Vec::new();
        loop {
            let t = lexer.next_token().unwrap();
            if t == Token::Eof {
                break;
            }
            tokens.push(t);
        }
        assert_eq!(
            tokens,
            vec![
                Token::AndAnd,
                Token::OrOr,
                Token::EqEq,
                Token::NotEq,
                Token::Le,
                Token::Ge,
                Token::Lt,
                Token::Gt,
                Token::Bang,
            ]
        );
    }

    #[test]
    fn test_single_ampersand_rejected() {
        assert_eq!(parse("a & b").unwrap_err(), ParseError::UnexpectedChar('&'));
        assert_eq!(parse("a = b").unwrap_err(), ParseError::UnexpectedChar('='));
    }

    #[test]
    fn test_variables_resolve_to_slots() {
        assert!(matches!(parse("b").unwrap(), Ast::Var(1)));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let ast = parse("a == 1 || a == 2 && b == 3").unwrap();
        let Ast::BinOp(BinOp::Or, _, right) = ast else {
            panic!("expected || at root");
        };
        assert!(matches!(*right, Ast::BinOp(BinOp::And, _, _)));
    }

    #[test]
    fn test_unknown_variable() {
        assert_eq!(
            parse("c > 1").unwrap_err(),
            ParseError::UnknownVariable("c".to_string())
        );
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            parse("sin(a)").unwrap_err(),
            ParseError::UnknownFunction("sin".to_string())
        );
    }

    #[test]
    fn test_wrong_arg_count() {
        assert!(matches!(
            parse("min(a)"),
            Err(ParseError::WrongArgCount { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn test_trailing_tokens() {
        assert!(matches!(parse("a b"), Err(ParseError::UnexpectedToken(_))));
    }

    #[test]
    fn test_unexpected_end() {
        assert_eq!(parse("a +").unwrap_err(), ParseError::UnexpectedEnd);
        assert_eq!(parse("").unwrap_err(), ParseError::UnexpectedEnd);
        assert_eq!(parse("(a").unwrap_err(), ParseError::UnexpectedEnd);
    }

    #[test]
    fn test_deep_parentheses_rejected() {
        let input = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(parse(&input).unwrap_err(), ParseError::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn test_deep_unary_rejected() {
        let input = format!("{}a", "-".repeat(200_000));
        assert_eq!(parse(&input).unwrap_err(), ParseError::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn test_long_operator_chain_rejected() {
        let input = vec!["a"; 100_000].join(" + ");
        assert_eq!(parse(&input).unwrap_err(), ParseError::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_DEPTH / 2;
        let input = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(parse(&input).unwrap(), Ast::Var(0)));

        let input = format!("{}a", "!".repeat(MAX_DEPTH - 1));
        assert!(parse(&input).is_ok());
    }

    #[test]
    fn test_number_overflow() {
        assert!(matches!(
            parse("99999999999999999999"),
            Err(ParseError::InvalidNumber(_))
        ));
    }
}
