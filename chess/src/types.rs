use chessrules_base::{Color, Piece, PieceId};

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a literal token of the rule language
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, got {token:?}")]
pub struct TokenError {
    pub expected: &'static str,
    pub token: String,
}

impl TokenError {
    fn new(expected: &'static str, token: &str) -> TokenError {
        TokenError {
            expected,
            token: token.to_string(),
        }
    }
}

/// Final result of the game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Color },
    Tie,
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Win { side } => Some(side),
            Outcome::Tie => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Outcome::Win { side } => write!(f, "{} wins", side),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

/// Which side of a transition to look at
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BoardState {
    /// Before the move
    ThisState,
    /// After the move
    NextState,
}

/// Which move of a transition to look at
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveState {
    /// The move being made
    ThisMove,
    /// The move preceding it
    LastMove,
}

/// Integer comparison
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl Comparator {
    pub fn compare(&self, lhs: usize, rhs: usize) -> bool {
        match *self {
            Comparator::Gt => lhs > rhs,
            Comparator::Lt => lhs < rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Eq => lhs == rhs,
            Comparator::Ne => lhs != rhs,
        }
    }
}

/// Selector for pieces on the board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PieceMatch {
    /// Any known piece
    Any,
    /// Any piece of the given side
    AnyOf(Color),
    /// Royal pieces of the given side
    Royal(Color),
    /// Pieces with the given identifier
    Exact(PieceId),
}

impl PieceMatch {
    /// Checks the piece `id`, described by `piece` if it is known
    pub fn matches(&self, id: &PieceId, piece: Option<&Piece>) -> bool {
        match self {
            PieceMatch::Any => piece.is_some(),
            PieceMatch::AnyOf(c) => piece.map_or(false, |p| p.owner().is(*c)),
            PieceMatch::Royal(c) => piece.map_or(false, |p| p.is_royal() && p.owner().is(*c)),
            PieceMatch::Exact(e) => e == id,
        }
    }
}

macro_rules! token_enum {
    ($ty:ident, $expected:literal, $($var:ident => $tok:literal),+ $(,)?) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
                match *self {
                    $($ty::$var => write!(f, $tok),)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = TokenError;

            fn from_str(s: &str) -> Result<$ty, Self::Err> {
                match s {
                    $($tok => Ok($ty::$var),)+
                    _ => Err(TokenError::new($expected, s)),
                }
            }
        }
    };
}

token_enum!(BoardState, "board state", ThisState => "this_state", NextState => "next_state");
token_enum!(MoveState, "move state", ThisMove => "this_move", LastMove => "last_move");
token_enum!(
    Comparator, "comparator",
    Gt => "gt", Lt => "lt", Ge => "ge", Le => "le", Eq => "eq", Ne => "ne",
);

impl Display for PieceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            PieceMatch::Any => write!(f, "ANY"),
            PieceMatch::AnyOf(Color::White) => write!(f, "ANY_WHITE"),
            PieceMatch::AnyOf(Color::Black) => write!(f, "ANY_BLACK"),
            PieceMatch::Royal(Color::White) => write!(f, "ROYAL_WHITE"),
            PieceMatch::Royal(Color::Black) => write!(f, "ROYAL_BLACK"),
            PieceMatch::Exact(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for PieceMatch {
    type Err = TokenError;

    /// Wildcards are matched ignoring case, identifiers are taken as is
    fn from_str(s: &str) -> Result<PieceMatch, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "ANY" => PieceMatch::Any,
            "ANY_WHITE" => PieceMatch::AnyOf(Color::White),
            "ANY_BLACK" => PieceMatch::AnyOf(Color::Black),
            "ROYAL_WHITE" => PieceMatch::Royal(Color::White),
            "ROYAL_BLACK" => PieceMatch::Royal(Color::Black),
            _ if !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') => {
                PieceMatch::Exact(PieceId::new(s))
            }
            _ => return Err(TokenError::new("piece identifier", s)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessrules_base::Owner;

    #[test]
    fn test_tokens() {
        for s in ["this_state", "next_state"] {
            assert_eq!(BoardState::from_str(s).unwrap().to_string(), s);
        }
        for s in ["this_move", "last_move"] {
            assert_eq!(MoveState::from_str(s).unwrap().to_string(), s);
        }
        for s in ["gt", "lt", "ge", "le", "eq", "ne"] {
            assert_eq!(Comparator::from_str(s).unwrap().to_string(), s);
        }
        assert_eq!(
            BoardState::from_str("now"),
            Err(TokenError {
                expected: "board state",
                token: "now".into()
            })
        );
        for s in ["ANY", "ANY_WHITE", "ANY_BLACK", "ROYAL_WHITE", "ROYAL_BLACK", "custom_3"] {
            assert_eq!(PieceMatch::from_str(s).unwrap().to_string(), s);
        }
        assert!(PieceMatch::from_str("a-b").is_err());
    }

    #[test]
    fn test_compare() {
        assert!(Comparator::Gt.compare(3, 2));
        assert!(!Comparator::Lt.compare(3, 2));
        assert!(Comparator::Ge.compare(2, 2));
        assert!(Comparator::Le.compare(1, 2));
        assert!(Comparator::Eq.compare(2, 2));
        assert!(Comparator::Ne.compare(1, 2));
    }

    #[test]
    fn test_match() {
        let king = Piece::builder("k", Owner::Black).royal(true).build();
        let id = king.id().clone();
        assert!(PieceMatch::Any.matches(&id, Some(&king)));
        assert!(!PieceMatch::Any.matches(&id, None));
        assert!(PieceMatch::AnyOf(Color::Black).matches(&id, Some(&king)));
        assert!(PieceMatch::Royal(Color::Black).matches(&id, Some(&king)));
        assert!(!PieceMatch::Royal(Color::White).matches(&id, Some(&king)));
        assert!(PieceMatch::Exact("k".into()).matches(&id, None));
    }

    #[test]
    fn test_match_parse() {
        assert_eq!(PieceMatch::from_str("royal_black"), Ok(PieceMatch::Royal(Color::Black)));
        assert_eq!(PieceMatch::from_str("Any_White"), Ok(PieceMatch::AnyOf(Color::White)));
        assert_eq!(PieceMatch::from_str("any"), Ok(PieceMatch::Any));
        assert_eq!(PieceMatch::from_str("k"), Ok(PieceMatch::Exact("k".into())));
        assert_eq!(PieceMatch::from_str("K"), Ok(PieceMatch::Exact("K".into())));
        assert!(PieceMatch::from_str("a-b").is_err());
    }
}
