//! Compiler of the rule language
//!
//! A rule script consists of lines `name = expression`, one of which must bind `return`.
//! The predicate is built from the expression bound to `return`, with every other bound name
//! substituted wherever it appears as an argument. Blank lines and lines starting with `#` are
//! ignored.
//!
//! Expressions use either canonical prefix calls (`AND(p,q)`, `NOT(p)` and so on) or infix
//! operators. From the highest precedence to the lowest, the operators are `!`, then `==` and
//! `!=`, then `&&`, `^`, `||` and `=>`. The last one is right-associative. Both parentheses and
//! square brackets group subexpressions.
//!
//! # Example
//!
//! ```
//! use chessrules::parser;
//!
//! let script = "
//!     # the black king is in check and cannot escape
//!     check = attacked(next_state, ROYAL_BLACK)
//!     return = check && for_every(check, black)
//! ";
//! let p = parser::parse_code(script).unwrap();
//! assert_eq!(
//!     p.to_string(),
//!     "AND(attacked(next_state,ROYAL_BLACK),for_every(attacked(next_state,ROYAL_BLACK),black))"
//! );
//! ```

mod expr;
mod lexer;
mod lower;
mod shunting;

pub use expr::Expr;
pub use lexer::InfixOp;
pub use lower::{BuildError, FunctionSpec, Param, MAX_ARITY};
pub use shunting::{parse_expr, shunting_yard, to_canonical, Rpn};

use crate::predicate::Predicate;

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

/// Error parsing an expression
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SyntaxError {
    /// Character which cannot start a token
    #[error("unexpected char {ch:?} at column {}", .pos + 1)]
    UnexpectedChar { pos: usize, ch: char },
    /// Number does not fit into the integer type
    #[error("number at column {} is too large", .pos + 1)]
    BadNumber { pos: usize },
    /// Token which cannot appear at this place
    #[error("unexpected {token:?} at column {}", .pos + 1)]
    UnexpectedToken { pos: usize, token: String },
    /// Expression ended too early
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// Opening bracket is never closed
    #[error("bracket at column {} is not closed", .pos + 1)]
    Unclosed { pos: usize },
    /// Operators and operands do not form a single expression
    #[error("malformed expression")]
    Malformed,
}

/// Error parsing a single expression into a predicate
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("cannot build predicate: {0}")]
    Build(#[from] BuildError),
}

/// Error compiling a rule script
///
/// Line numbers are zero-based.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CompileError {
    /// Syntax error in the expression on the line
    #[error("line {}: {}", .line + 1, .source)]
    Syntax { line: usize, source: SyntaxError },
    /// Line is not a binding
    #[error("line {}: expected `name = expression`", .line + 1)]
    NotBinding { line: usize },
    /// Binding name is not an identifier
    #[error("line {}: bad name {name:?}", .line + 1)]
    BadName { line: usize, name: String },
    /// Binding name is a reserved word
    #[error("line {}: {name:?} is a reserved word", .line + 1)]
    Reserved { line: usize, name: String },
    /// Name is bound twice
    #[error("line {}: {name:?} is already bound", .line + 1)]
    Duplicate { line: usize, name: String },
    /// There is no `return` binding
    #[error("no `return` binding")]
    MissingReturn,
    /// Binding refers to itself, directly or through other bindings
    #[error("binding {0:?} refers to itself")]
    Cycle(String),
    /// Error building the predicate
    #[error("cannot build predicate: {0}")]
    Build(#[from] BuildError),
}

/// Name of the binding which holds the resulting predicate
pub const RETURN: &str = "return";

const KEYWORDS: &[&str] = &[
    "this_state",
    "next_state",
    "this_move",
    "last_move",
    "gt",
    "lt",
    "ge",
    "le",
    "eq",
    "ne",
    "true",
    "false",
    "white",
    "black",
    "from",
    "to",
    "absolute",
    "relative",
    "any",
    "any_white",
    "any_black",
    "royal_white",
    "royal_black",
];

/// Returns `true` if `name` cannot be used as a binding name
///
/// Reserved are the literal keywords and the names of all the functions, ignoring case.
pub fn is_reserved(name: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
        || lower::function_names().any(|f| f.eq_ignore_ascii_case(name))
}

fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

struct Line<'a> {
    line: usize,
    name: &'a str,
    text: &'a str,
}

fn split_lines(code: &str) -> Result<Vec<Line<'_>>, CompileError> {
    let mut res = Vec::new();
    for (line, text) in code.lines().enumerate() {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let (name, text) = text
            .split_once('=')
            .ok_or(CompileError::NotBinding { line })?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(CompileError::BadName {
                line,
                name: name.to_string(),
            });
        }
        res.push(Line { line, name, text });
    }
    Ok(res)
}

/// Compiles a rule script into a predicate
///
/// Binding names are checked before any expression is parsed.
pub fn parse_code(code: &str) -> Result<Predicate, CompileError> {
    let lines = split_lines(code)?;
    let mut seen = HashMap::new();
    for l in &lines {
        if l.name.eq_ignore_ascii_case(RETURN) {
            if seen.insert(RETURN, l.line).is_some() {
                return Err(CompileError::Duplicate {
                    line: l.line,
                    name: l.name.to_string(),
                });
            }
            continue;
        }
        if is_reserved(l.name) {
            return Err(CompileError::Reserved {
                line: l.line,
                name: l.name.to_string(),
            });
        }
        if seen.insert(l.name, l.line).is_some() {
            return Err(CompileError::Duplicate {
                line: l.line,
                name: l.name.to_string(),
            });
        }
    }
    if !seen.contains_key(RETURN) {
        return Err(CompileError::MissingReturn);
    }

    let exprs = lines
        .iter()
        .map(|l| {
            let name = if l.name.eq_ignore_ascii_case(RETURN) {
                RETURN
            } else {
                l.name
            };
            parse_expr(l.text)
                .map(|e| (name, e))
                .map_err(|source| CompileError::Syntax {
                    line: l.line,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut bindings = expr::Bindings::new(exprs.iter().map(|(n, e)| (*n, e)));
    let resolved = bindings.resolve(RETURN)?;
    let res = lower::lower(&resolved)?;
    debug!("compiled rule {}", res);
    Ok(res)
}

/// Parses a single expression into a predicate
///
/// The expression may not refer to any bindings.
pub fn parse_predicate(s: &str) -> Result<Predicate, ExprError> {
    Ok(lower::lower(&parse_expr(s)?)?)
}
