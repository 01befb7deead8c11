use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("rank {0} is out of range")]
    RankOutOfRange(usize),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

/// Square on a board of at most [`Coord::MAX_SIZE`] files and ranks
///
/// Files are lettered from `a` to `t`, ranks are numbered from `1` to `20`. Internally, both
/// are zero-based. Coordinates are ordered by rank first, so iteration order matches the
/// order of squares in [`SquareSet`](crate::SquareSet).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    rank: u8,
    file: u8,
}

impl Coord {
    /// Maximum number of files and ranks
    pub const MAX_SIZE: usize = 20;
    /// Number of distinct coordinates
    pub const COUNT: usize = Self::MAX_SIZE * Self::MAX_SIZE;

    pub const fn from_parts(file: usize, rank: usize) -> Coord {
        assert!(
            file < Self::MAX_SIZE && rank < Self::MAX_SIZE,
            "file and rank must be between 0 and 19"
        );
        Coord {
            rank: rank as u8,
            file: file as u8,
        }
    }

    pub const fn try_from_parts(file: isize, rank: isize) -> Option<Coord> {
        if file < 0 || rank < 0 || file >= Self::MAX_SIZE as isize || rank >= Self::MAX_SIZE as isize
        {
            return None;
        }
        Some(Coord {
            rank: rank as u8,
            file: file as u8,
        })
    }

    pub const fn from_index(val: usize) -> Coord {
        assert!(val < Self::COUNT, "coord index must be between 0 and 399");
        Coord {
            rank: (val / Self::MAX_SIZE) as u8,
            file: (val % Self::MAX_SIZE) as u8,
        }
    }

    pub const fn file(&self) -> usize {
        self.file as usize
    }

    pub const fn rank(&self) -> usize {
        self.rank as usize
    }

    /// Board-independent index, with a fixed stride of [`Coord::MAX_SIZE`] per rank
    pub const fn index(&self) -> usize {
        self.rank as usize * Self::MAX_SIZE + self.file as usize
    }

    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        Coord::try_from_parts(
            self.file as isize + delta_file,
            self.rank as isize + delta_rank,
        )
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn file_from_char(c: char) -> Option<usize> {
        match c {
            'a'..='t' => Some((u32::from(c) - u32::from('a')) as usize),
            _ => None,
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Coord::from_index)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Coord({})", self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !matches!(s.len(), 2 | 3) || !s.is_ascii() {
            return Err(CoordParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let file_ch = bytes[0] as char;
        let file = Coord::file_from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?;
        if bytes[1] == b'0' {
            return Err(CoordParseError::UnexpectedRankChar('0'));
        }
        let mut rank = 0_usize;
        for &b in &bytes[1..] {
            if !b.is_ascii_digit() {
                return Err(CoordParseError::UnexpectedRankChar(b as char));
            }
            rank = rank * 10 + (b - b'0') as usize;
        }
        if rank > Coord::MAX_SIZE {
            return Err(CoordParseError::RankOutOfRange(rank));
        }
        Ok(Coord::from_parts(file, rank - 1))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Rank direction in which this side advances
    pub const fn forward(&self) -> i8 {
        match *self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => return Ok(Color::White),
            "black" => return Ok(Color::Black),
            _ => {}
        }
        if s.len() != 1 {
            return Err(ColorParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch))
    }
}

/// Side a piece belongs to
///
/// Shared pieces belong to neither player: nobody may move them, but they block movement
/// and can be captured by both sides if they are capturable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Owner {
    White,
    Black,
    Shared,
}

impl Owner {
    pub const fn color(&self) -> Option<Color> {
        match *self {
            Owner::White => Some(Color::White),
            Owner::Black => Some(Color::Black),
            Owner::Shared => None,
        }
    }

    pub fn is(&self, c: Color) -> bool {
        self.color() == Some(c)
    }
}

impl From<Color> for Owner {
    fn from(c: Color) -> Owner {
        match c {
            Color::White => Owner::White,
            Color::Black => Owner::Black,
        }
    }
}
