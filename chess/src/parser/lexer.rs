use super::SyntaxError;

use std::fmt;

/// Infix operator of the rule language
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Not,
    Equals,
    NotEquals,
    And,
    Xor,
    Or,
    Implies,
}

impl InfixOp {
    #[inline]
    pub fn precedence(self) -> u8 {
        match self {
            InfixOp::Not => 5,
            InfixOp::Equals | InfixOp::NotEquals => 4,
            InfixOp::And => 3,
            InfixOp::Xor => 2,
            InfixOp::Or => 1,
            InfixOp::Implies => 0,
        }
    }

    #[inline]
    pub fn is_unary(self) -> bool {
        self == InfixOp::Not
    }

    #[inline]
    pub fn is_right_assoc(self) -> bool {
        matches!(self, InfixOp::Implies | InfixOp::Not)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Not => "!",
            InfixOp::Equals => "==",
            InfixOp::NotEquals => "!=",
            InfixOp::And => "&&",
            InfixOp::Xor => "^",
            InfixOp::Or => "||",
            InfixOp::Implies => "=>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(i64),
    Op(InfixOp),
    Open(char),
    Close(char),
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Op(op) => write!(f, "{}", op.as_str()),
            Token::Open(c) | Token::Close(c) => write!(f, "{}", c),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Token with its byte offset in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Splits the expression text into tokens
pub fn tokenize(s: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let bytes = s.as_bytes();
    let mut res = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let token = match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'(' | b'[' => Token::Open(bytes[pos] as char),
            b')' | b']' => Token::Close(bytes[pos] as char),
            b',' => Token::Comma,
            b'^' => Token::Op(InfixOp::Xor),
            b'!' if next == Some(b'=') => {
                pos += 1;
                Token::Op(InfixOp::NotEquals)
            }
            b'!' => Token::Op(InfixOp::Not),
            b'=' if next == Some(b'=') => {
                pos += 1;
                Token::Op(InfixOp::Equals)
            }
            b'=' if next == Some(b'>') => {
                pos += 1;
                Token::Op(InfixOp::Implies)
            }
            b'&' if next == Some(b'&') => {
                pos += 1;
                Token::Op(InfixOp::And)
            }
            b'|' if next == Some(b'|') => {
                pos += 1;
                Token::Op(InfixOp::Or)
            }
            b'-' | b'0'..=b'9' => {
                if bytes[pos] == b'-' && !next.map_or(false, |c| c.is_ascii_digit()) {
                    return Err(SyntaxError::UnexpectedChar { pos, ch: '-' });
                }
                pos += 1;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                // Digit-led identifiers such as `4pawn`
                if bytes[start] != b'-' && pos < bytes.len() && is_ident_char(bytes[pos]) {
                    while pos < bytes.len() && is_ident_char(bytes[pos]) {
                        pos += 1;
                    }
                    res.push(Spanned {
                        token: Token::Ident(s[start..pos].to_string()),
                        pos: start,
                    });
                    continue;
                }
                let value = s[start..pos]
                    .parse()
                    .map_err(|_| SyntaxError::BadNumber { pos: start })?;
                res.push(Spanned {
                    token: Token::Number(value),
                    pos: start,
                });
                continue;
            }
            c if is_ident_char(c) => {
                while pos < bytes.len() && is_ident_char(bytes[pos]) {
                    pos += 1;
                }
                res.push(Spanned {
                    token: Token::Ident(s[start..pos].to_string()),
                    pos: start,
                });
                continue;
            }
            _ => {
                let ch = s[pos..].chars().next().unwrap_or('\0');
                return Err(SyntaxError::UnexpectedChar { pos, ch });
            }
        };
        pos += 1;
        res.push(Spanned { token, pos: start });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<Token> {
        tokenize(s).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            tokens("!a&&[b_1 || c]"),
            vec![
                Token::Op(InfixOp::Not),
                Token::Ident("a".into()),
                Token::Op(InfixOp::And),
                Token::Open('['),
                Token::Ident("b_1".into()),
                Token::Op(InfixOp::Or),
                Token::Ident("c".into()),
                Token::Close(']'),
            ]
        );
        assert_eq!(
            tokens("relative(-1, 20,from)"),
            vec![
                Token::Ident("relative".into()),
                Token::Open('('),
                Token::Number(-1),
                Token::Comma,
                Token::Number(20),
                Token::Comma,
                Token::Ident("from".into()),
                Token::Close(')'),
            ]
        );
        assert_eq!(
            tokens("a=>b != c==d ^ e"),
            vec![
                Token::Ident("a".into()),
                Token::Op(InfixOp::Implies),
                Token::Ident("b".into()),
                Token::Op(InfixOp::NotEquals),
                Token::Ident("c".into()),
                Token::Op(InfixOp::Equals),
                Token::Ident("d".into()),
                Token::Op(InfixOp::Xor),
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn test_digit_led_ident() {
        assert_eq!(
            tokens("piece_at(absolute(a1), 4pawn, this_state)"),
            vec![
                Token::Ident("piece_at".into()),
                Token::Open('('),
                Token::Ident("absolute".into()),
                Token::Open('('),
                Token::Ident("a1".into()),
                Token::Close(')'),
                Token::Comma,
                Token::Ident("4pawn".into()),
                Token::Comma,
                Token::Ident("this_state".into()),
                Token::Close(')'),
            ]
        );
        assert_eq!(
            tokens("-4 12"),
            vec![Token::Number(-4), Token::Number(12)]
        );
        assert_eq!(
            tokens("-4pawn"),
            vec![Token::Number(-4), Token::Ident("pawn".into())]
        );
    }

    #[test]
    fn test_positions() {
        let res = tokenize("  ab && c").unwrap();
        assert_eq!(res.iter().map(|t| t.pos).collect::<Vec<_>>(), vec![2, 5, 8]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("a & b"),
            Err(SyntaxError::UnexpectedChar { pos: 2, ch: '&' })
        );
        assert_eq!(
            tokenize("a = b"),
            Err(SyntaxError::UnexpectedChar { pos: 2, ch: '=' })
        );
        assert_eq!(
            tokenize("f(- 1)"),
            Err(SyntaxError::UnexpectedChar { pos: 2, ch: '-' })
        );
        assert_eq!(
            tokenize("a ∧ b"),
            Err(SyntaxError::UnexpectedChar { pos: 2, ch: '∧' })
        );
        assert_eq!(
            tokenize("99999999999999999999"),
            Err(SyntaxError::BadNumber { pos: 0 })
        );
    }
}
