//! Utilities to work with moves in coordinate notation
//!
//! A move is written as its source square followed by its destination square, like `e2e4` or
//! `j10j12`. Depending on the number of rank digits, the string is four to six chars long.

use chessrules_base::{Coord, CoordParseError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a move in coordinate notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum NotationError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
}

/// Move in coordinate notation
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Notation {
    pub src: Coord,
    pub dst: Coord,
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)
    }
}

impl FromStr for Notation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Notation, Self::Err> {
        if !matches!(s.len(), 4..=6) || !s.is_ascii() {
            return Err(NotationError::BadLength);
        }
        // The source rank has two digits iff the third char is a digit
        let split = if s.as_bytes()[2].is_ascii_digit() { 3 } else { 2 };
        let src = Coord::from_str(&s[..split]).map_err(NotationError::BadSrc)?;
        let dst = Coord::from_str(&s[split..]).map_err(NotationError::BadDst)?;
        Ok(Notation { src, dst })
    }
}
