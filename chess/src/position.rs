//! Absolute and relative board positions

use chessrules_base::Coord;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("expected \"from\" or \"to\", got {0:?}")]
pub struct AnchorParseError(pub String);

/// Square a relative position is measured from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Source square of the move
    From,
    /// Destination square of the move
    To,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Anchor::From => write!(f, "from"),
            Anchor::To => write!(f, "to"),
        }
    }
}

impl FromStr for Anchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Anchor, Self::Err> {
        match s {
            "from" => Ok(Anchor::From),
            "to" => Ok(Anchor::To),
            _ => Err(AnchorParseError(s.to_string())),
        }
    }
}

/// Position on the board, either fixed or measured from one of the move endpoints
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    Absolute(Coord),
    Relative { dx: i8, dy: i8, anchor: Anchor },
}

impl Position {
    /// Source square of the move
    pub const FROM: Position = Position::Relative {
        dx: 0,
        dy: 0,
        anchor: Anchor::From,
    };

    /// Destination square of the move
    pub const TO: Position = Position::Relative {
        dx: 0,
        dy: 0,
        anchor: Anchor::To,
    };

    pub const fn relative(dx: i8, dy: i8, anchor: Anchor) -> Position {
        Position::Relative { dx, dy, anchor }
    }

    /// Resolves the position against the move endpoints
    ///
    /// Returns `None` if the position falls outside the coordinate space.
    pub fn resolve(&self, from: Coord, to: Coord) -> Option<Coord> {
        match *self {
            Position::Absolute(c) => Some(c),
            Position::Relative { dx, dy, anchor } => {
                let base = match anchor {
                    Anchor::From => from,
                    Anchor::To => to,
                };
                base.try_shift(dx as isize, dy as isize)
            }
        }
    }
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Position {
        Position::Absolute(c)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Position::Absolute(c) => write!(f, "absolute({})", c),
            Position::Relative { dx, dy, anchor } => {
                write!(f, "relative({},{},{})", dx, dy, anchor)
            }
        }
    }
}
