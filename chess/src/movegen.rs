//! Pattern-driven move generation

use crate::board::Board;
use crate::moves::Move;
use crate::registry::PieceRegistry;

use chessrules_base::{Color, Coord, Pattern, Piece, SquareSet};

use std::ops::{Deref, DerefMut};

/// Squares reachable by a piece, split into plain moves and captures
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Reach {
    pub moves: SquareSet,
    pub captures: SquareSet,
}

impl Reach {
    #[inline]
    pub fn all(&self) -> SquareSet {
        self.moves | self.captures
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(Vec<Move>);

impl MoveList {
    pub fn new() -> MoveList {
        MoveList::default()
    }
}

impl Deref for MoveList {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> MoveList {
        MoveList(iter.into_iter().collect())
    }
}

/// Occupant of `c`, with `vacated` considered free
fn occupant<'a>(
    b: &'a Board,
    reg: &'a PieceRegistry,
    c: Coord,
    vacated: Coord,
) -> Option<Option<&'a Piece>> {
    if c == vacated {
        return None;
    }
    b.get(c).map(|id| reg.get(id.as_str()))
}

fn walk_moves(b: &Board, reg: &PieceRegistry, p: &Pattern, from: Coord, vacated: Coord) -> SquareSet {
    let mut res = SquareSet::EMPTY;
    let walk = p.walk(from, b.width(), b.height());
    let min = walk.min_step();
    for (step, c) in walk {
        if occupant(b, reg, c, vacated).is_some() {
            break;
        }
        if step >= min {
            res.set(c);
        }
    }
    res
}

fn walk_captures(
    b: &Board,
    reg: &PieceRegistry,
    mover: &Piece,
    p: &Pattern,
    from: Coord,
    vacated: Coord,
) -> SquareSet {
    let walk = p.walk(from, b.width(), b.height());
    let min = walk.min_step();
    for (step, c) in walk {
        match occupant(b, reg, c, vacated) {
            None => continue,
            Some(Some(victim)) if step >= min && mover.can_capture(victim) => {
                return SquareSet::from_coord(c)
            }
            Some(_) => break,
        }
    }
    SquareSet::EMPTY
}

/// Computes plain moves and captures of the piece standing on `src`
///
/// With a non-zero repeat count, movement patterns are applied again from every newly reached
/// square, up to `repeat` extra times. The source square counts as vacated during the whole
/// search. Captures end the path, so they never extend it.
///
/// Free squares and unknown pieces yield an empty result.
pub fn reach(b: &Board, reg: &PieceRegistry, src: Coord) -> Reach {
    let Some(piece) = b.get(src).and_then(|id| reg.get(id.as_str())) else {
        return Reach::default();
    };
    let mut res = Reach::default();
    let mut visited = SquareSet::from_coord(src);
    let mut frontier = visited;
    for _ in 0..=piece.repeat() {
        let mut next = SquareSet::EMPTY;
        for from in frontier {
            for p in piece.movements() {
                next |= walk_moves(b, reg, p, from, src);
            }
            for p in piece.captures() {
                res.captures |= walk_captures(b, reg, piece, p, from, src);
            }
        }
        res.moves |= next;
        frontier = next & !visited;
        visited |= next;
        if frontier.is_empty() {
            break;
        }
    }
    res.moves.unset(src);
    res
}

/// Computes the squares threatened by the piece standing on `src`
///
/// Capture patterns are walked as if every piece could be captured: free squares within the
/// length bounds are threatened, as well as the first occupied square on each path,
/// whoever owns it.
pub fn threats(b: &Board, reg: &PieceRegistry, src: Coord) -> SquareSet {
    let Some(piece) = b.get(src).and_then(|id| reg.get(id.as_str())) else {
        return SquareSet::EMPTY;
    };
    let mut res = SquareSet::EMPTY;
    for p in piece.captures() {
        let walk = p.walk(src, b.width(), b.height());
        let min = walk.min_step();
        for (step, c) in walk {
            if step >= min {
                res.set(c);
            }
            if !b.is_free(c) {
                break;
            }
        }
    }
    res
}

fn owned_by<'a>(
    b: &'a Board,
    reg: &'a PieceRegistry,
    side: Color,
) -> impl Iterator<Item = Coord> + 'a {
    b.pieces()
        .filter(move |(_, id)| reg.get(id.as_str()).map_or(false, |p| p.owner().is(side)))
        .map(|(c, _)| c)
}

/// Generates all the raw moves of `side`, without checking any legality rules
pub fn raw_moves(b: &Board, reg: &PieceRegistry, side: Color) -> MoveList {
    let mut res = MoveList::new();
    for src in owned_by(b, reg, side) {
        for dst in reach(b, reg, src).all() {
            res.push(Move::new(src, dst, side));
        }
    }
    res
}

/// Union of the capture sets of all the pieces of `side`
pub fn capture_set(b: &Board, reg: &PieceRegistry, side: Color) -> SquareSet {
    owned_by(b, reg, side).fold(SquareSet::EMPTY, |acc, src| {
        acc | reach(b, reg, src).captures
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard;
    use chessrules_base::{Owner, Piece};

    fn names(s: SquareSet) -> Vec<String> {
        s.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_initial() {
        let b = standard::board();
        let reg = standard::registry();
        let knight = reach(&b, &reg, "g1".parse().unwrap());
        assert_eq!(names(knight.all()), vec!["f3", "h3"]);
        assert!(knight.captures.is_empty());

        assert!(reach(&b, &reg, "a1".parse().unwrap()).all().is_empty());
        assert!(reach(&b, &reg, "e4".parse().unwrap()).all().is_empty());
        assert_eq!(
            names(reach(&b, &reg, "e2".parse().unwrap()).all()),
            vec!["e3"]
        );
        assert_eq!(raw_moves(&b, &reg, Color::White).len(), 12);
        assert_eq!(raw_moves(&b, &reg, Color::Black).len(), 12);
    }

    #[test]
    fn test_captures() {
        let b = Board::from_layout("4k3/8/8/3p4/4P3/8/8/4K2R").unwrap();
        let reg = standard::registry();
        let pawn = reach(&b, &reg, "e4".parse().unwrap());
        assert_eq!(names(pawn.moves), vec!["e5"]);
        assert_eq!(names(pawn.captures), vec!["d5"]);

        let rook = reach(&b, &reg, "h1".parse().unwrap());
        assert_eq!(
            names(rook.moves),
            vec!["f1", "g1", "h2", "h3", "h4", "h5", "h6", "h7", "h8"]
        );
        assert!(rook.captures.is_empty());

        assert_eq!(names(capture_set(&b, &reg, Color::Black)), vec!["e4"]);
        assert_eq!(names(capture_set(&b, &reg, Color::White)), vec!["d5"]);
    }

    #[test]
    fn test_unknown_blocks() {
        let b = Board::from_layout("8/8/8/8/8/8/8/R2{stone}4").unwrap();
        let reg = standard::registry();
        let rook = reach(&b, &reg, "a1".parse().unwrap());
        assert_eq!(rook.moves.len(), 9);
        assert!(!rook.all().has("d1".parse().unwrap()));
        assert!(reach(&b, &reg, "d1".parse().unwrap()).all().is_empty());
    }

    #[test]
    fn test_repeat() {
        let reg: PieceRegistry = [Piece::builder("W", Owner::White)
            .movement(Pattern::step(1, 0))
            .repeat(2)
            .build()]
        .into_iter()
        .collect();
        let b = Board::from_layout("W4").unwrap();
        assert_eq!(
            names(reach(&b, &reg, "a1".parse().unwrap()).moves),
            vec!["b1", "c1", "d1"]
        );

        let b = Board::from_layout("W1{W}2").unwrap();
        assert_eq!(
            names(reach(&b, &reg, "a1".parse().unwrap()).moves),
            vec!["b1"]
        );
    }

    #[test]
    fn test_min_length() {
        let reg: PieceRegistry = [Piece::builder("L", Owner::White)
            .movement(Pattern::regular(1, 0, 2, Some(3)).unwrap())
            .build()]
        .into_iter()
        .collect();
        let b = Board::from_layout("L5").unwrap();
        assert_eq!(
            names(reach(&b, &reg, "a1".parse().unwrap()).moves),
            vec!["c1", "d1"]
        );
    }

    #[test]
    fn test_shared() {
        let reg: PieceRegistry = [
            standard::registry().get("R").cloned().unwrap(),
            Piece::builder("w", Owner::Shared).build(),
            Piece::builder("x", Owner::Shared).capturable(false).build(),
        ]
        .into_iter()
        .collect();
        let b = Board::from_layout("w2R2x").unwrap();
        let rook = reach(&b, &reg, "d1".parse().unwrap());
        assert_eq!(names(rook.captures), vec!["a1"]);
        assert_eq!(names(rook.moves), vec!["b1", "c1", "e1", "f1"]);
        assert!(raw_moves(&b, &reg, Color::Black).is_empty());
    }

    #[test]
    fn test_threats() {
        let b = Board::from_layout("8/8/8/8/8/8/8/R2N4").unwrap();
        let reg = standard::registry();
        let th = threats(&b, &reg, "a1".parse().unwrap());
        assert!(th.has("d1".parse().unwrap()));
        assert!(!th.has("e1".parse().unwrap()));
        assert!(th.has("a8".parse().unwrap()));
        assert!(reach(&b, &reg, "a1".parse().unwrap()).captures.is_empty());
    }
}
