//! Operator precedence parsing of infix expressions

use super::expr::Expr;
use super::lexer::{self, InfixOp, Spanned, Token};
use super::SyntaxError;
use crate::predicate::{BinaryOp, Operator};

use std::fmt;

/// Item of an expression in reverse Polish notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rpn {
    Operand(Expr),
    Op(InfixOp),
}

impl fmt::Display for Rpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Rpn::Operand(e) => write!(f, "{}", e),
            Rpn::Op(op) => write!(f, "{}", op.as_str()),
        }
    }
}

enum Stacked {
    Op(InfixOp),
    Group { open: char, pos: usize },
}

fn closing(open: char) -> char {
    match open {
        '[' => ']',
        _ => ')',
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    idx: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.idx)
    }

    /// Converts tokens into reverse Polish notation
    ///
    /// Stops at the end of input, at a comma outside of groups, or at a closing parenthesis
    /// which has no matching opening one, without consuming it.
    fn rpn(&mut self) -> Result<Vec<Rpn>, SyntaxError> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut expect_operand = true;
        while let Some(tok) = self.peek() {
            let unexpected = || SyntaxError::UnexpectedToken {
                pos: tok.pos,
                token: tok.token.to_string(),
            };
            match tok.token {
                Token::Ident(ref name) if expect_operand => {
                    self.idx += 1;
                    let operand = match self.peek() {
                        Some(Spanned {
                            token: Token::Open('('),
                            pos,
                        }) => {
                            self.idx += 1;
                            self.call(name, *pos)?
                        }
                        _ => Expr::Name(name.clone()),
                    };
                    out.push(Rpn::Operand(operand));
                    expect_operand = false;
                }
                Token::Number(n) if expect_operand => {
                    self.idx += 1;
                    out.push(Rpn::Operand(Expr::Number(n)));
                    expect_operand = false;
                }
                Token::Op(op) if op.is_unary() && expect_operand => {
                    self.idx += 1;
                    stack.push(Stacked::Op(op));
                }
                Token::Op(op) if !op.is_unary() && !expect_operand => {
                    self.idx += 1;
                    while let Some(&Stacked::Op(top)) = stack.last() {
                        let prec = (top.precedence(), op.precedence());
                        if prec.0 > prec.1 || (prec.0 == prec.1 && !op.is_right_assoc()) {
                            out.push(Rpn::Op(top));
                            stack.pop();
                        } else {
                            break;
                        }
                    }
                    stack.push(Stacked::Op(op));
                    expect_operand = true;
                }
                Token::Open(open) if expect_operand => {
                    self.idx += 1;
                    stack.push(Stacked::Group {
                        open,
                        pos: tok.pos,
                    });
                }
                Token::Close(close) if !expect_operand => {
                    let has_group = stack.iter().any(|s| matches!(s, Stacked::Group { .. }));
                    if !has_group {
                        break;
                    }
                    self.idx += 1;
                    while let Some(s) = stack.pop() {
                        match s {
                            Stacked::Op(op) => out.push(Rpn::Op(op)),
                            Stacked::Group { open, .. } if closing(open) == close => break,
                            Stacked::Group { .. } => return Err(unexpected()),
                        }
                    }
                }
                Token::Comma if !expect_operand => {
                    if stack.iter().any(|s| matches!(s, Stacked::Group { .. })) {
                        return Err(unexpected());
                    }
                    break;
                }
                _ => return Err(unexpected()),
            }
        }
        if expect_operand {
            return Err(match self.peek() {
                Some(tok) => SyntaxError::UnexpectedToken {
                    pos: tok.pos,
                    token: tok.token.to_string(),
                },
                None => SyntaxError::UnexpectedEnd,
            });
        }
        while let Some(s) = stack.pop() {
            match s {
                Stacked::Op(op) => out.push(Rpn::Op(op)),
                Stacked::Group { pos, .. } => return Err(SyntaxError::Unclosed { pos }),
            }
        }
        Ok(out)
    }

    /// Parses call arguments, the opening parenthesis at `open` being already consumed
    fn call(&mut self, name: &str, open: usize) -> Result<Expr, SyntaxError> {
        let mut args = Vec::new();
        if let Some(Token::Close(')')) = self.peek().map(|t| &t.token) {
            self.idx += 1;
            return Ok(Expr::call(name, args));
        }
        loop {
            let arg = self.rpn()?;
            args.push(build(arg)?);
            let Some(tok) = self.peek() else {
                return Err(SyntaxError::Unclosed { pos: open });
            };
            self.idx += 1;
            match tok.token {
                Token::Comma => continue,
                Token::Close(')') => return Ok(Expr::call(name, args)),
                _ => {
                    return Err(SyntaxError::UnexpectedToken {
                        pos: tok.pos,
                        token: tok.token.to_string(),
                    })
                }
            }
        }
    }
}

/// Converts an expression into reverse Polish notation
///
/// Function calls are parsed recursively and end up as single operands. Parentheses and square
/// brackets both group subexpressions, while a parenthesis directly after a name opens a call.
pub fn shunting_yard(s: &str) -> Result<Vec<Rpn>, SyntaxError> {
    let tokens = lexer::tokenize(s)?;
    let mut parser = Parser {
        tokens: &tokens,
        idx: 0,
    };
    let res = parser.rpn()?;
    match parser.peek() {
        Some(tok) => Err(SyntaxError::UnexpectedToken {
            pos: tok.pos,
            token: tok.token.to_string(),
        }),
        None => Ok(res),
    }
}

fn operator_call(op: Operator, args: Vec<Expr>) -> Expr {
    Expr::call(op.to_string(), args)
}

/// Builds the expression tree from reverse Polish notation
pub fn build(rpn: Vec<Rpn>) -> Result<Expr, SyntaxError> {
    let mut stack = Vec::new();
    for item in rpn {
        let op = match item {
            Rpn::Operand(e) => {
                stack.push(e);
                continue;
            }
            Rpn::Op(op) => op,
        };
        if op.is_unary() {
            let arg = stack.pop().ok_or(SyntaxError::Malformed)?;
            stack.push(operator_call(Operator::Not, vec![arg]));
            continue;
        }
        let rhs = stack.pop().ok_or(SyntaxError::Malformed)?;
        let lhs = stack.pop().ok_or(SyntaxError::Malformed)?;
        let args = vec![lhs, rhs];
        let e = match op {
            InfixOp::Equals => operator_call(Operator::Binary(BinaryOp::Equals), args),
            InfixOp::NotEquals => operator_call(
                Operator::Not,
                vec![operator_call(Operator::Binary(BinaryOp::Equals), args)],
            ),
            InfixOp::And => operator_call(Operator::Binary(BinaryOp::And), args),
            InfixOp::Xor => operator_call(Operator::Binary(BinaryOp::Xor), args),
            InfixOp::Or => operator_call(Operator::Binary(BinaryOp::Or), args),
            InfixOp::Implies => operator_call(Operator::Binary(BinaryOp::Implies), args),
            InfixOp::Not => return Err(SyntaxError::Malformed),
        };
        stack.push(e);
    }
    match (stack.pop(), stack.is_empty()) {
        (Some(e), true) => Ok(e),
        _ => Err(SyntaxError::Malformed),
    }
}

/// Rebuilds the expression in canonical prefix form, such as `OR(NOT(a),b)`
pub fn to_canonical(rpn: &[Rpn]) -> Result<String, SyntaxError> {
    build(rpn.to_vec()).map(|e| e.to_string())
}

/// Parses an infix or prefix expression into a tree
pub fn parse_expr(s: &str) -> Result<Expr, SyntaxError> {
    build(shunting_yard(s)?)
}
