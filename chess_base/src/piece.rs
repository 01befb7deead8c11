use crate::types::{Coord, Owner};

use derive_more::{Display, From};
use std::borrow::Borrow;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orthogonal unit directions
pub const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
/// Diagonal unit directions
pub const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];
/// Knight jump offsets
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Direction or offset is `(0, 0)`
    #[error("pattern direction must be non-zero")]
    ZeroDirection,
    /// Minimum length exceeds the maximum one
    #[error("pattern length range {min}..={max} is empty")]
    EmptyRange { min: u8, max: u8 },
}

/// Movement pattern of a piece
///
/// A regular pattern walks in a fixed unit direction for between `min` and `max` steps,
/// stopping at the first occupied square. A jump pattern lands on a single offset
/// regardless of what lies between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Regular {
        dx: i8,
        dy: i8,
        min: u8,
        /// `None` means unbounded
        max: Option<u8>,
    },
    Jump {
        dx: i8,
        dy: i8,
    },
}

impl Pattern {
    /// Creates a regular pattern
    ///
    /// The direction is normalized to its sign, so `(2, -3)` becomes `(1, -1)`. Minimum length
    /// below one is raised to one.
    pub fn regular(dx: i8, dy: i8, min: u8, max: Option<u8>) -> Result<Pattern, PatternError> {
        if dx == 0 && dy == 0 {
            return Err(PatternError::ZeroDirection);
        }
        let min = min.max(1);
        if let Some(max) = max {
            if max < min {
                return Err(PatternError::EmptyRange { min, max });
            }
        }
        Ok(Pattern::Regular {
            dx: dx.signum(),
            dy: dy.signum(),
            min,
            max,
        })
    }

    pub fn jump(dx: i8, dy: i8) -> Result<Pattern, PatternError> {
        if dx == 0 && dy == 0 {
            return Err(PatternError::ZeroDirection);
        }
        Ok(Pattern::Jump { dx, dy })
    }

    /// Unbounded slide in direction `(dx, dy)`
    pub fn slide(dx: i8, dy: i8) -> Pattern {
        Pattern::Regular {
            dx: dx.signum(),
            dy: dy.signum(),
            min: 1,
            max: None,
        }
    }

    /// Single step in direction `(dx, dy)`
    pub fn step(dx: i8, dy: i8) -> Pattern {
        Pattern::Regular {
            dx: dx.signum(),
            dy: dy.signum(),
            min: 1,
            max: Some(1),
        }
    }

    #[inline]
    pub fn offset(&self) -> (i8, i8) {
        match *self {
            Pattern::Regular { dx, dy, .. } | Pattern::Jump { dx, dy } => (dx, dy),
        }
    }

    #[inline]
    pub fn is_jump(&self) -> bool {
        matches!(self, Pattern::Jump { .. })
    }

    /// Coordinates visited by this pattern from `src`, in walk order, paired with the step count
    ///
    /// The walk stops at the board edge given by `width` and `height`. Occupancy is not taken into
    /// account here.
    pub fn walk(&self, src: Coord, width: usize, height: usize) -> Walk {
        let (dx, dy) = self.offset();
        let (limit, min) = match *self {
            Pattern::Regular { min, max, .. } => (
                max.map_or(Coord::MAX_SIZE, |m| m as usize),
                min as usize,
            ),
            Pattern::Jump { .. } => (1, 1),
        };
        Walk {
            cur: Some(src),
            dx: dx as isize,
            dy: dy as isize,
            step: 0,
            min,
            limit,
            width,
            height,
        }
    }
}

/// Iterator returned by [`Pattern::walk()`]
pub struct Walk {
    cur: Option<Coord>,
    dx: isize,
    dy: isize,
    step: usize,
    min: usize,
    limit: usize,
    width: usize,
    height: usize,
}

impl Walk {
    /// Minimum step at which a square counts as a destination
    #[inline]
    pub fn min_step(&self) -> usize {
        self.min
    }
}

impl Iterator for Walk {
    type Item = (usize, Coord);

    fn next(&mut self) -> Option<(usize, Coord)> {
        if self.step >= self.limit {
            return None;
        }
        let next = self.cur?.try_shift(self.dx, self.dy);
        self.cur = next.filter(|c| c.file() < self.width && c.rank() < self.height);
        self.step += 1;
        self.cur.map(|c| (self.step, c))
    }
}

/// Unique identifier of a piece kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PieceId(String);

impl PieceId {
    pub fn new(s: impl Into<String>) -> PieceId {
        PieceId(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PieceId {
    fn from(s: &str) -> PieceId {
        PieceId(s.to_string())
    }
}

impl Borrow<str> for PieceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Piece kind, described by its patterns and flags
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "crate::record::PieceRecord", try_from = "crate::record::PieceRecord")
)]
pub struct Piece {
    id: PieceId,
    owner: Owner,
    movements: Vec<Pattern>,
    captures: Vec<Pattern>,
    repeat: u8,
    royal: bool,
    capturable: bool,
}

impl Piece {
    /// Maximum number of extra movement repetitions
    pub const MAX_REPEAT: u8 = 3;

    pub fn builder(id: impl Into<PieceId>, owner: Owner) -> PieceBuilder {
        PieceBuilder {
            id: id.into(),
            owner,
            movements: Vec::new(),
            captures: None,
            repeat: 0,
            royal: false,
            capturable: true,
        }
    }

    #[inline]
    pub fn id(&self) -> &PieceId {
        &self.id
    }

    #[inline]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    #[inline]
    pub fn movements(&self) -> &[Pattern] {
        &self.movements
    }

    #[inline]
    pub fn captures(&self) -> &[Pattern] {
        &self.captures
    }

    /// Number of times the movement patterns are chained after the first application
    #[inline]
    pub fn repeat(&self) -> u8 {
        self.repeat
    }

    #[inline]
    pub fn is_royal(&self) -> bool {
        self.royal
    }

    #[inline]
    pub fn is_capturable(&self) -> bool {
        self.capturable
    }

    /// Returns `true` if this piece may capture `other`
    ///
    /// Owners must differ and `other` must be capturable. Shared pieces may thus capture
    /// and be captured by both players.
    pub fn can_capture(&self, other: &Piece) -> bool {
        self.owner != other.owner && other.capturable
    }
}

/// Builder for [`Piece`]
#[derive(Debug, Clone)]
pub struct PieceBuilder {
    id: PieceId,
    owner: Owner,
    movements: Vec<Pattern>,
    captures: Option<Vec<Pattern>>,
    repeat: u8,
    royal: bool,
    capturable: bool,
}

impl PieceBuilder {
    pub fn movement(mut self, p: Pattern) -> Self {
        self.movements.push(p);
        self
    }

    pub fn movements(mut self, ps: impl IntoIterator<Item = Pattern>) -> Self {
        self.movements.extend(ps);
        self
    }

    /// Adds a capture pattern
    ///
    /// If no capture patterns are given, the piece captures the same way it moves.
    pub fn capture(mut self, p: Pattern) -> Self {
        self.captures.get_or_insert_with(Vec::new).push(p);
        self
    }

    pub fn captures(mut self, ps: impl IntoIterator<Item = Pattern>) -> Self {
        self.captures.get_or_insert_with(Vec::new).extend(ps);
        self
    }

    /// Sets the repeat count, clamped to [`Piece::MAX_REPEAT`]
    pub fn repeat(mut self, n: u8) -> Self {
        self.repeat = n.min(Piece::MAX_REPEAT);
        self
    }

    pub fn royal(mut self, royal: bool) -> Self {
        self.royal = royal;
        self
    }

    pub fn capturable(mut self, capturable: bool) -> Self {
        self.capturable = capturable;
        self
    }

    pub fn build(self) -> Piece {
        let captures = self.captures.unwrap_or_else(|| self.movements.clone());
        Piece {
            id: self.id,
            owner: self.owner,
            movements: self.movements,
            captures,
            repeat: self.repeat,
            royal: self.royal,
            capturable: self.capturable,
        }
    }
}
