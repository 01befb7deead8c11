//! Generators of special moves

use crate::movegen::MoveList;
use crate::moves::{Action, Move};
use crate::position::{Anchor, Position};
use crate::predicate::Predicate;
use crate::transition::BoardTransition;
use crate::types::{BoardState, MoveState, PieceMatch};
use crate::worker::MoveWorker;

use chessrules_base::{Color, Coord, PieceId};

use std::sync::Arc;

/// Options for [`MoveTemplate::castling()`]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CastlingOptions {
    /// Forbid castling when the king starts on, passes through or lands on a threatened square
    pub check_attacks: bool,
}

/// Parametrized special move
///
/// Every piece with the identifier `piece` gets a candidate move to `target`, which is resolved
/// against the square the piece stands on. The candidate is accepted if its actions succeed and
/// both the template predicate and the external legality predicate hold for its transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTemplate {
    piece: PieceId,
    target: Position,
    predicate: Predicate,
    actions: Arc<[Action]>,
}

fn not(p: Predicate) -> Predicate {
    p.negate()
}

fn rel(dx: i8, dy: i8) -> Position {
    Position::relative(dx, dy, Anchor::From)
}

fn empty(pos: Position) -> Predicate {
    Predicate::SquareEmpty {
        pos,
        state: BoardState::ThisState,
    }
}

fn moved(pos: Position) -> Predicate {
    Predicate::HasMoved {
        pos,
        state: BoardState::ThisState,
    }
}

fn all(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    preds
        .into_iter()
        .reduce(Predicate::and)
        .unwrap_or(Predicate::TRUE)
}

impl MoveTemplate {
    pub fn new(
        piece: impl Into<PieceId>,
        target: Position,
        predicate: Predicate,
        actions: impl Into<Arc<[Action]>>,
    ) -> MoveTemplate {
        MoveTemplate {
            piece: piece.into(),
            target,
            predicate,
            actions: actions.into(),
        }
    }

    /// Two squares forward for a piece which has not moved yet, over a free square
    pub fn double_step(piece: impl Into<PieceId>, side: Color) -> MoveTemplate {
        let f = side.forward();
        let predicate = all([
            not(moved(Position::FROM)),
            empty(rel(0, f)),
            empty(rel(0, 2 * f)),
        ]);
        MoveTemplate::new(piece, rel(0, 2 * f), predicate, vec![Action::MOVE])
    }

    /// Diagonal capture of a `victim` which has just made a double step to the square `dx` files
    /// aside
    pub fn en_passant(
        piece: impl Into<PieceId>,
        side: Color,
        dx: i8,
        victim: impl Into<PieceId>,
    ) -> MoveTemplate {
        let f = side.forward();
        let victim = PieceMatch::Exact(victim.into());
        let predicate = all([
            empty(Position::TO),
            Predicate::PieceAt {
                pos: rel(dx, 0),
                target: victim.clone(),
                state: BoardState::ThisState,
            },
            Predicate::MoveWas {
                from: rel(dx, 2 * f),
                to: rel(dx, 0),
                which: MoveState::LastMove,
            },
            Predicate::PieceMoved {
                target: victim,
                which: MoveState::LastMove,
            },
        ]);
        let actions = vec![Action::MOVE, Action::DeletePiece { at: rel(dx, 0) }];
        MoveTemplate::new(piece, rel(dx, f), predicate, actions)
    }

    /// King move by `step` files towards the `rook` standing `rook_dx` files aside
    ///
    /// The rook ends up on the square the king passed over. Neither piece must have moved, and
    /// the squares between them must be free.
    pub fn castling(
        king: impl Into<PieceId>,
        rook: impl Into<PieceId>,
        side: Color,
        rook_dx: i8,
        step: i8,
        options: CastlingOptions,
    ) -> MoveTemplate {
        let sign = rook_dx.signum();
        let mut preds = vec![
            not(moved(Position::FROM)),
            Predicate::PieceAt {
                pos: rel(rook_dx, 0),
                target: PieceMatch::Exact(rook.into()),
                state: BoardState::ThisState,
            },
            not(moved(rel(rook_dx, 0))),
        ];
        preds.extend((1..rook_dx.abs()).map(|i| empty(rel(sign * i, 0))));
        if options.check_attacks {
            preds.extend((0..=step.abs()).map(|i| {
                not(Predicate::SquareAttacked {
                    pos: rel(sign * i, 0),
                    state: BoardState::ThisState,
                    attacker: PieceMatch::AnyOf(side.inv()),
                })
            }));
        }
        let actions = vec![
            Action::MOVE,
            Action::MovePiece {
                from: rel(rook_dx, 0),
                to: rel(step - sign, 0),
            },
        ];
        MoveTemplate::new(king, rel(step, 0), all(preds), actions)
    }

    /// Step forward onto the rank `rank`, replacing the piece with `into`
    pub fn promotion(
        piece: impl Into<PieceId>,
        side: Color,
        into: impl Into<PieceId>,
        rank: usize,
    ) -> MoveTemplate {
        let predicate = empty(Position::TO).and(Predicate::HasRank {
            pos: Position::TO,
            value: rank,
        });
        let actions = vec![
            Action::MOVE,
            Action::SetPiece {
                at: Position::TO,
                piece: into.into(),
            },
        ];
        MoveTemplate::new(piece, rel(0, side.forward()), predicate, actions)
    }

    #[inline]
    pub fn piece(&self) -> &PieceId {
        &self.piece
    }

    #[inline]
    pub fn target(&self) -> Position {
        self.target
    }

    #[inline]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn candidates(&self, worker: &MoveWorker, side: Color) -> Vec<Move> {
        let owned = worker
            .registry()
            .get(self.piece.as_str())
            .map_or(false, |p| p.owner().is(side));
        if !owned {
            return Vec::new();
        }
        let board = worker.board();
        board
            .find(self.piece.as_str())
            .filter_map(|src| {
                let dst = self.target.resolve(src, src).filter(|&c| board.contains(c))?;
                Some(Move::with_actions(src, dst, side, Arc::clone(&self.actions)))
            })
            .collect()
    }

    fn accepts(&self, worker: &MoveWorker, mv: Move, legality: &Predicate) -> bool {
        let t = BoardTransition::with_move(worker, mv);
        t.is_performed() && self.predicate.eval(&t) && legality.eval(&t)
    }

    /// All the accepted moves of `side`
    pub fn get_valid_moves(
        &self,
        worker: &MoveWorker,
        side: Color,
        legality: &Predicate,
    ) -> MoveList {
        self.candidates(worker, side)
            .into_iter()
            .filter(|mv| self.accepts(worker, mv.clone(), legality))
            .collect()
    }

    /// Returns `true` if `side` has at least one accepted move
    pub fn has_valid_moves(&self, worker: &MoveWorker, side: Color, legality: &Predicate) -> bool {
        self.candidates(worker, side)
            .into_iter()
            .any(|mv| self.accepts(worker, mv, legality))
    }

    /// Returns the accepted move from `src` to `dst`, if there is one
    pub fn find_move(
        &self,
        worker: &MoveWorker,
        side: Color,
        src: Coord,
        dst: Coord,
        legality: &Predicate,
    ) -> Option<Move> {
        self.candidates(worker, side)
            .into_iter()
            .find(|mv| mv.src() == src && mv.dst() == dst)
            .filter(|mv| self.accepts(worker, mv.clone(), legality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::standard;

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn worker(layout: &str) -> MoveWorker {
        let board = Board::from_layout(layout).unwrap();
        MoveWorker::new(board, Arc::new(standard::registry()))
    }

    fn legality(side: Color) -> Predicate {
        not(Predicate::Attacked {
            state: BoardState::NextState,
            target: PieceMatch::Royal(side),
        })
    }

    fn names(moves: &MoveList) -> Vec<String> {
        let mut res: Vec<_> = moves.iter().map(|m| m.to_string()).collect();
        res.sort();
        res
    }

    fn short(check_attacks: bool) -> MoveTemplate {
        MoveTemplate::castling("K", "R", Color::White, 3, 2, CastlingOptions { check_attacks })
    }

    fn long() -> MoveTemplate {
        MoveTemplate::castling(
            "K",
            "R",
            Color::White,
            -4,
            -2,
            CastlingOptions {
                check_attacks: true,
            },
        )
    }

    #[test]
    fn test_double_step() {
        let mut w = standard::worker();
        let t = MoveTemplate::double_step("P", Color::White);
        let lgl = legality(Color::White);
        assert_eq!(t.get_valid_moves(&w, Color::White, &lgl).len(), 8);
        assert!(t.get_valid_moves(&w, Color::Black, &lgl).is_empty());

        w.make_move(coord("e2"), coord("e3")).unwrap();
        w.make_move(coord("d7"), coord("d6")).unwrap();
        w.make_move(coord("d2"), coord("d3")).unwrap();
        w.make_move(coord("d6"), coord("d5")).unwrap();
        w.make_move(coord("g1"), coord("f3")).unwrap();
        let moves = t.get_valid_moves(&w, Color::White, &lgl);
        let names = names(&moves);
        assert_eq!(names.len(), 5);
        assert!(!names.contains(&"e3e5".to_string()));
        assert!(!names.contains(&"f2f4".to_string()));
    }

    #[test]
    fn test_en_passant() {
        let mut w = worker("4k3/3p4/8/4P3/8/8/8/4K3");
        let t = MoveTemplate::en_passant("P", Color::White, -1, "p");
        let lgl = legality(Color::White);
        assert!(!t.has_valid_moves(&w, Color::White, &lgl));

        w.perform(Move::new(coord("d7"), coord("d5"), Color::Black), true)
            .unwrap();
        let moves = t.get_valid_moves(&w, Color::White, &lgl);
        assert_eq!(names(&moves), vec!["e5d6"]);

        let mv = moves[0].clone();
        w.perform(mv, true).unwrap();
        assert_eq!(w.board().as_layout(), "4k3/8/3P4/8/8/8/8/4K3");
        assert_eq!(w.last_move().and_then(Move::captured), Some(&"p".into()));
    }

    #[test]
    fn test_en_passant_stale() {
        let mut w = worker("4k3/3p4/8/4P3/8/8/8/4K3");
        w.perform(Move::new(coord("d7"), coord("d5"), Color::Black), true)
            .unwrap();
        w.make_move(coord("e1"), coord("e2")).unwrap();
        w.make_move(coord("e8"), coord("e7")).unwrap();
        let t = MoveTemplate::en_passant("P", Color::White, -1, "p");
        assert!(!t.has_valid_moves(&w, Color::White, &legality(Color::White)));
    }

    #[test]
    fn test_castling() {
        let w = worker("r3k2r/8/8/8/8/8/8/R3K2R");
        let lgl = legality(Color::White);
        let moves = short(true).get_valid_moves(&w, Color::White, &lgl);
        assert_eq!(names(&moves), vec!["e1g1"]);
        let moves = long().get_valid_moves(&w, Color::White, &lgl);
        assert_eq!(names(&moves), vec!["e1c1"]);

        let mut w = w;
        w.perform(moves[0].clone(), true).unwrap();
        assert_eq!(w.board().as_layout(), "r3k2r/8/8/8/8/8/8/2KR3R");
    }

    #[test]
    fn test_castling_moved() {
        let lgl = legality(Color::White);
        let mut board = Board::from_layout("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        board.set_moved(coord("h1"), true);
        let w = MoveWorker::new(board.clone(), Arc::new(standard::registry()));
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
        assert!(long().has_valid_moves(&w, Color::White, &lgl));

        board.set_moved(coord("h1"), false);
        board.set_moved(coord("e1"), true);
        let w = MoveWorker::new(board, Arc::new(standard::registry()));
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
        assert!(!long().has_valid_moves(&w, Color::White, &lgl));
    }

    #[test]
    fn test_castling_blocked() {
        let lgl = legality(Color::White);
        let w = worker("r3k2r/8/8/8/8/8/8/RN2KB1R");
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
        assert!(!long().has_valid_moves(&w, Color::White, &lgl));
        let w = worker("r3k2r/8/8/8/8/8/8/R3K2N");
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
    }

    #[test]
    fn test_castling_attacked() {
        let lgl = legality(Color::White);
        // The rook on f2 watches f1, which the king passes over
        let w = worker("4k3/8/8/8/8/8/5r2/R3K2R");
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
        assert!(short(false).has_valid_moves(&w, Color::White, &lgl));
        assert!(long().has_valid_moves(&w, Color::White, &lgl));

        // Castling out of check
        let w = worker("4k3/8/8/8/8/8/4r3/R3K2R");
        assert!(!short(true).has_valid_moves(&w, Color::White, &lgl));
        assert!(!long().has_valid_moves(&w, Color::White, &lgl));
    }

    #[test]
    fn test_promotion() {
        let w = worker("4k3/1P6/8/8/8/8/8/4K3");
        let t = MoveTemplate::promotion("P", Color::White, "N", 8);
        let lgl = legality(Color::White);
        let moves = t.get_valid_moves(&w, Color::White, &lgl);
        assert_eq!(names(&moves), vec!["b7b8"]);
        assert!(t
            .find_move(&w, Color::White, coord("b7"), coord("b8"), &lgl)
            .is_some());
        assert!(t
            .find_move(&w, Color::White, coord("b7"), coord("b6"), &lgl)
            .is_none());

        let mut w = w;
        w.perform(moves[0].clone(), true).unwrap();
        assert_eq!(w.board().get(coord("b8")), Some(&"N".into()));
        assert_eq!(w.last_move().and_then(Move::captured), None);
    }
}
