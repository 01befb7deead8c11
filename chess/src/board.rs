//! Board and related things

use chessrules_base::{Coord, PieceId, SquareSet};

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error parsing board layout
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum LayoutParseError {
    /// Rank is wider than the first one
    #[error("too many items in rank {0}")]
    RankOverflow(usize),
    /// Rank is narrower than the first one
    #[error("not enough items in rank {0}")]
    RankUnderflow(usize),
    /// More than [`Coord::MAX_SIZE`] ranks
    #[error("too many ranks")]
    TooManyRanks,
    /// More than [`Coord::MAX_SIZE`] files
    #[error("too many files")]
    TooManyFiles,
    /// Layout has no squares
    #[error("empty board")]
    Empty,
    /// Run of empty squares is zero or too long
    #[error("bad run length {0}")]
    BadRun(usize),
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    /// `{` without matching `}`
    #[error("unclosed brace")]
    UnclosedBrace,
    /// `{}` with nothing inside
    #[error("empty identifier")]
    EmptyIdentifier,
}

/// Contents of a single square
///
/// Zero means the square is free. Otherwise, the value minus one is an index in the board
/// palette of piece identifiers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
struct Cell(u16);

impl Cell {
    const EMPTY: Cell = Cell(0);

    #[inline]
    fn is_free(self) -> bool {
        self.0 == 0
    }
}

/// Rectangular board with up to [`Coord::MAX_SIZE`] files and ranks
///
/// The squares are stored in a flat buffer, so cloning the board is a bulk copy. Piece
/// identifiers are interned in a palette shared between clones, which is copied only when a
/// new identifier appears on one of them.
///
/// Apart from the pieces, the board keeps a "has moved" flag for each square. A square is
/// flagged when a piece arrives there and unflagged when the piece leaves.
#[derive(Debug, Clone)]
pub struct Board {
    width: u8,
    height: u8,
    cells: Vec<Cell>,
    palette: Arc<Vec<PieceId>>,
    moved: SquareSet,
}

/// Run of equal squares, as returned by [`Board::runs()`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Run {
    /// Piece on the squares, or `None` if they are free
    pub piece: Option<PieceId>,
    pub count: usize,
}

/// Compact board representation for state exporters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardExport {
    pub width: usize,
    pub height: usize,
    pub runs: Vec<Run>,
}

impl Board {
    /// Creates an empty board
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or greater than [`Coord::MAX_SIZE`].
    pub fn empty(width: usize, height: usize) -> Board {
        assert!(
            (1..=Coord::MAX_SIZE).contains(&width) && (1..=Coord::MAX_SIZE).contains(&height),
            "board dimensions must be between 1 and 20"
        );
        Board {
            width: width as u8,
            height: height as u8,
            cells: vec![Cell::EMPTY; width * height],
            palette: Arc::new(Vec::new()),
            moved: SquareSet::EMPTY,
        }
    }

    /// Parses the board from layout notation
    ///
    /// The notation is similar to the first part of FEN: ranks go from top to bottom and are
    /// separated with `/`, numbers denote runs of free squares. Single-letter identifiers are
    /// written as-is, longer ones are enclosed in braces, like `{archbishop}`.
    pub fn from_layout(s: &str) -> Result<Board, LayoutParseError> {
        s.parse()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.file() < self.width() && c.rank() < self.height()
    }

    /// Local index of the square, `rank * width + file`
    #[inline]
    pub fn index_of(&self, c: Coord) -> Option<usize> {
        self.contains(c)
            .then(|| c.rank() * self.width() + c.file())
    }

    #[inline]
    pub fn coord_at(&self, idx: usize) -> Option<Coord> {
        (idx < self.cells.len()).then(|| Coord::from_parts(idx % self.width(), idx / self.width()))
    }

    /// Iterates over all the squares in index order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(|i| Coord::from_parts(i % self.width(), i / self.width()))
    }

    fn resolve(&self, cell: Cell) -> Option<&PieceId> {
        if cell.is_free() {
            return None;
        }
        self.palette.get(cell.0 as usize - 1)
    }

    fn intern(&mut self, id: PieceId) -> Cell {
        if let Some(pos) = self.palette.iter().position(|p| *p == id) {
            return Cell(pos as u16 + 1);
        }
        let palette = Arc::make_mut(&mut self.palette);
        palette.push(id);
        Cell(palette.len() as u16)
    }

    /// Returns the piece on the square, or `None` if the square is free or off the board
    #[inline]
    pub fn get(&self, c: Coord) -> Option<&PieceId> {
        self.resolve(self.cells[self.index_of(c)?])
    }

    #[inline]
    pub fn is_free(&self, c: Coord) -> bool {
        self.get(c).is_none()
    }

    /// Puts the piece on the square, returning the previous occupant
    ///
    /// Squares outside the board are ignored.
    pub fn put(&mut self, c: Coord, piece: Option<PieceId>) -> Option<PieceId> {
        let idx = self.index_of(c)?;
        let old = self.resolve(self.cells[idx]).cloned();
        let cell = match piece {
            Some(id) => self.intern(id),
            None => Cell::EMPTY,
        };
        self.cells[idx] = cell;
        old
    }

    /// Removes the piece from the square and returns it
    pub fn take(&mut self, c: Coord) -> Option<PieceId> {
        self.put(c, None)
    }

    #[inline]
    pub fn has_moved(&self, c: Coord) -> bool {
        self.moved.has(c)
    }

    pub fn set_moved(&mut self, c: Coord, moved: bool) {
        if !self.contains(c) {
            return;
        }
        if moved {
            self.moved.set(c);
        } else {
            self.moved.unset(c);
        }
    }

    #[inline]
    pub fn moved(&self) -> SquareSet {
        self.moved
    }

    /// Returns the set of occupied squares
    pub fn occupied(&self) -> SquareSet {
        self.coords().filter(|&c| !self.is_free(c)).collect()
    }

    /// Iterates over all the occupied squares together with their pieces
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, &PieceId)> + '_ {
        self.coords().filter_map(move |c| Some((c, self.get(c)?)))
    }

    /// Returns all the squares holding the piece `id`
    pub fn find<'a>(&'a self, id: &'a str) -> impl Iterator<Item = Coord> + 'a {
        self.pieces()
            .filter(move |(_, p)| p.as_str() == id)
            .map(|(c, _)| c)
    }

    /// Run-length encoding of the board, scanned in index order
    pub fn runs(&self) -> Vec<Run> {
        let mut res: Vec<Run> = Vec::new();
        for &cell in &self.cells {
            let piece = self.resolve(cell);
            match res.last_mut() {
                Some(run) if run.piece.as_ref() == piece => run.count += 1,
                _ => res.push(Run {
                    piece: piece.cloned(),
                    count: 1,
                }),
            }
        }
        res
    }

    pub fn export(&self) -> BoardExport {
        BoardExport {
            width: self.width(),
            height: self.height(),
            runs: self.runs(),
        }
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use chessrules::board::{Board, PrettyStyle};
    /// #
    /// let b = Board::from_layout("k3/4/1P2/3K").unwrap();
    /// let res = r#"
    ///  4|k...
    ///  3|....
    ///  2|.P..
    ///  1|...K
    /// --+----
    ///   |abcd
    /// "#;
    /// assert_eq!(b.pretty(PrettyStyle::Ascii).to_string().trim_matches('\n'), res.trim_matches('\n'));
    /// ```
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { board: self, style }
    }

    /// Converts the board into layout notation
    pub fn as_layout(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.moved == other.moved
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(&a, &b)| self.resolve(a) == other.resolve(b))
    }
}

impl Eq for Board {}

/// Style for [`Board::pretty()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrettyStyle {
    /// Use only ASCII characters
    Ascii,
    /// Use Unicode chess symbols for the standard pieces
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See [`Board::pretty()`] for details.
pub struct Pretty<'a> {
    board: &'a Board,
    style: PrettyStyle,
}

fn parse_rank(s: &str) -> Result<Vec<Option<PieceId>>, LayoutParseError> {
    let mut res = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '0'..='9' => {
                let mut num = ch as usize - '0' as usize;
                while let Some(&d @ '0'..='9') = chars.peek() {
                    num = num * 10 + (d as usize - '0' as usize);
                    chars.next();
                    if num > Coord::MAX_SIZE {
                        return Err(LayoutParseError::BadRun(num));
                    }
                }
                if num == 0 || num > Coord::MAX_SIZE {
                    return Err(LayoutParseError::BadRun(num));
                }
                res.extend(std::iter::repeat(None).take(num));
            }
            '{' => {
                let mut id = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) if c.is_ascii_alphanumeric() || c == '_' => id.push(c),
                        Some(c) => return Err(LayoutParseError::UnexpectedChar(c)),
                        None => return Err(LayoutParseError::UnclosedBrace),
                    }
                }
                if id.is_empty() {
                    return Err(LayoutParseError::EmptyIdentifier);
                }
                res.push(Some(PieceId::new(id)));
            }
            c if c.is_ascii_alphabetic() => res.push(Some(PieceId::new(c.to_string()))),
            c => return Err(LayoutParseError::UnexpectedChar(c)),
        }
        if res.len() > Coord::MAX_SIZE {
            return Err(LayoutParseError::TooManyFiles);
        }
    }
    Ok(res)
}

impl FromStr for Board {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        let ranks: Vec<&str> = s.split('/').collect();
        if ranks.len() > Coord::MAX_SIZE {
            return Err(LayoutParseError::TooManyRanks);
        }
        let height = ranks.len();
        let mut rows = Vec::with_capacity(height);
        for (i, rank) in ranks.iter().enumerate() {
            let row = parse_rank(rank)?;
            let rank_no = height - i;
            if let Some(first) = rows.first().map(Vec::len) {
                if row.len() > first {
                    return Err(LayoutParseError::RankOverflow(rank_no));
                }
                if row.len() < first {
                    return Err(LayoutParseError::RankUnderflow(rank_no));
                }
            }
            rows.push(row);
        }
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(LayoutParseError::Empty);
        }
        let mut board = Board::empty(width, height);
        for (i, row) in rows.into_iter().enumerate() {
            let rank = height - 1 - i;
            for (file, piece) in row.into_iter().enumerate() {
                board.put(Coord::from_parts(file, rank), piece);
            }
        }
        Ok(board)
    }
}

fn format_id(id: &PieceId, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    let s = id.as_str();
    if s.len() == 1 && s.as_bytes()[0].is_ascii_alphabetic() {
        write!(f, "{}", s)
    } else {
        write!(f, "{{{}}}", s)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in (0..self.height()).rev() {
            if rank + 1 != self.height() {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in 0..self.width() {
                match self.get(Coord::from_parts(file, rank)) {
                    None => empty += 1,
                    Some(id) => {
                        if empty != 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        format_id(id, f)?;
                    }
                }
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        Ok(())
    }
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const FREE: char;

    fn piece(id: &PieceId) -> char;

    fn fmt(b: &Board, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let label = if b.height() >= 10 { 2 } else { 1 };
        for rank in (0..b.height()).rev() {
            write!(f, "{:>w$}{}", rank + 1, Self::VERT_FRAME, w = label + 1)?;
            for file in 0..b.width() {
                match b.get(Coord::from_parts(file, rank)) {
                    Some(id) => write!(f, "{}", Self::piece(id))?,
                    None => write!(f, "{}", Self::FREE)?,
                }
            }
            writeln!(f)?;
        }
        for _ in 0..=label {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        write!(f, "{}", Self::ANGLE_FRAME)?;
        for _ in 0..b.width() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{:>w$}{}", "", Self::VERT_FRAME, w = label + 1)?;
        for file in 0..b.width() {
            write!(f, "{}", Coord::from_parts(file, 0).file_char())?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const FREE: char = '.';

    fn piece(id: &PieceId) -> char {
        id.as_str().chars().next().unwrap_or('?')
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const FREE: char = '.';

    fn piece(id: &PieceId) -> char {
        match id.as_str() {
            "P" => '♙',
            "N" => '♘',
            "B" => '♗',
            "R" => '♖',
            "Q" => '♕',
            "K" => '♔',
            "p" => '♟',
            "n" => '♞',
            "b" => '♝',
            "r" => '♜',
            "q" => '♛',
            "k" => '♚',
            _ => AsciiStyleTable::piece(id),
        }
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.board, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.board, f),
        }
    }
}
