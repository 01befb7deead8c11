//! Boolean predicates over board transitions

use crate::movegen;
use crate::position::Position;
use crate::transition::BoardTransition;
use crate::types::{BoardState, Comparator, MoveState, PieceMatch};
use crate::worker::MoveWorker;

use chessrules_base::{Color, PieceId, SquareSet};

use std::fmt;

use log::trace;
use thiserror::Error;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PredicateError {
    /// Operator applied to a wrong number of operands
    #[error("operator {op} takes {expected} operands, got {got}")]
    Arity {
        op: Operator,
        expected: usize,
        got: usize,
    },
}

/// Binary logical operator
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Implies,
    Xor,
    Equals,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            BinaryOp::And => lhs && rhs,
            BinaryOp::Or => lhs || rhs,
            BinaryOp::Implies => !lhs || rhs,
            BinaryOp::Xor => lhs != rhs,
            BinaryOp::Equals => lhs == rhs,
        }
    }
}

/// Logical operator, as named in the rule language
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    Binary(BinaryOp),
}

impl Operator {
    pub fn arity(&self) -> usize {
        match self {
            Operator::Not => 1,
            Operator::Binary(_) => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let s = match self {
            Operator::Not => "NOT",
            Operator::Binary(BinaryOp::And) => "AND",
            Operator::Binary(BinaryOp::Or) => "OR",
            Operator::Binary(BinaryOp::Implies) => "IMPLIES",
            Operator::Binary(BinaryOp::Xor) => "XOR",
            Operator::Binary(BinaryOp::Equals) => "EQUALS",
        };
        write!(f, "{}", s)
    }
}

/// Predicate over a [`BoardTransition`]
///
/// Evaluation is pure: it never changes either state of the transition. Positions are
/// resolved against the endpoints of the transition move. Predicates looking at a square
/// outside the board evaluate to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    Const(bool),
    Not(Box<Predicate>),
    Binary(BinaryOp, Box<Predicate>, Box<Predicate>),
    /// Some piece matching `target` can be captured
    Attacked {
        state: BoardState,
        target: PieceMatch,
    },
    /// Number of pieces matching `target` compares to `value`
    PiecesLeft {
        target: PieceMatch,
        cmp: Comparator,
        value: usize,
        state: BoardState,
    },
    /// The move was made by a piece matching `target`
    PieceMoved {
        target: PieceMatch,
        which: MoveState,
    },
    /// The move captured a piece matching `target`
    PieceCaptured {
        target: PieceMatch,
        which: MoveState,
    },
    /// Piece on the square has moved
    HasMoved { pos: Position, state: BoardState },
    /// Square is on the given rank, counting from one
    HasRank { pos: Position, value: usize },
    /// Square is on the given file, counting from one
    HasFile { pos: Position, value: usize },
    /// Square is threatened by some piece matching `attacker`
    SquareAttacked {
        pos: Position,
        state: BoardState,
        attacker: PieceMatch,
    },
    /// Square is free
    SquareEmpty { pos: Position, state: BoardState },
    /// Square holds a piece matching `target`
    PieceAt {
        pos: Position,
        target: PieceMatch,
        state: BoardState,
    },
    /// The move goes between the given squares
    MoveWas {
        from: Position,
        to: Position,
        which: MoveState,
    },
    /// The move is the first (`ThisMove`) or the second (`LastMove`) one in the game
    FirstMove { which: MoveState },
    /// `rule` holds for every raw move of `side` after the transition
    ForEvery { rule: Box<Predicate>, side: Color },
}

impl Predicate {
    pub const TRUE: Predicate = Predicate::Const(true);
    pub const FALSE: Predicate = Predicate::Const(false);

    /// Applies the operator to the operands
    ///
    /// `NOT` takes exactly one operand, all the other operators take exactly two.
    pub fn apply(op: Operator, args: Vec<Predicate>) -> Result<Predicate, PredicateError> {
        if args.len() != op.arity() {
            return Err(PredicateError::Arity {
                op,
                expected: op.arity(),
                got: args.len(),
            });
        }
        let mut args = args.into_iter();
        let mut next = || Box::new(args.next().unwrap_or(Predicate::FALSE));
        Ok(match op {
            Operator::Not => Predicate::Not(next()),
            Operator::Binary(b) => {
                let lhs = next();
                Predicate::Binary(b, lhs, next())
            }
        })
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::Binary(BinaryOp::And, Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Binary(BinaryOp::Or, Box::new(self), Box::new(other))
    }

    /// Evaluates the predicate
    pub fn eval(&self, t: &BoardTransition<'_>) -> bool {
        let resolve = |pos: &Position, w: &MoveWorker| {
            pos.resolve(t.from(), t.to())
                .filter(|&c| w.board().contains(c))
        };
        match self {
            Predicate::Const(v) => *v,
            Predicate::Not(p) => !p.eval(t),
            Predicate::Binary(op, lhs, rhs) => {
                let lhs = lhs.eval(t);
                match (op, lhs) {
                    (BinaryOp::And, false) => false,
                    (BinaryOp::Or, true) => true,
                    (BinaryOp::Implies, false) => true,
                    _ => op.apply(lhs, rhs.eval(t)),
                }
            }
            Predicate::Attacked { state, target } => {
                let w = t.state(*state);
                let targets = matching(w, target);
                (targets & all_captures(w)).is_nonempty()
            }
            Predicate::PiecesLeft {
                target,
                cmp,
                value,
                state,
            } => cmp.compare(matching(t.state(*state), target).len(), *value),
            Predicate::PieceMoved { target, which } => t
                .move_at(*which)
                .and_then(|m| m.piece())
                .map_or(false, |id| id_matches(t.next_state(), target, id)),
            Predicate::PieceCaptured { target, which } => t
                .move_at(*which)
                .and_then(|m| m.captured())
                .map_or(false, |id| id_matches(t.next_state(), target, id)),
            Predicate::HasMoved { pos, state } => {
                let w = t.state(*state);
                resolve(pos, w).map_or(false, |c| w.board().has_moved(c))
            }
            Predicate::HasRank { pos, value } => resolve(pos, t.next_state())
                .map_or(false, |c| c.rank() + 1 == *value),
            Predicate::HasFile { pos, value } => resolve(pos, t.next_state())
                .map_or(false, |c| c.file() + 1 == *value),
            Predicate::SquareAttacked {
                pos,
                state,
                attacker,
            } => {
                let w = t.state(*state);
                let Some(c) = resolve(pos, w) else {
                    return false;
                };
                matching(w, attacker)
                    .iter()
                    .any(|src| movegen::threats(w.board(), w.registry(), src).has(c))
            }
            Predicate::SquareEmpty { pos, state } => {
                let w = t.state(*state);
                resolve(pos, w).map_or(false, |c| w.board().is_free(c))
            }
            Predicate::PieceAt { pos, target, state } => {
                let w = t.state(*state);
                resolve(pos, w)
                    .and_then(|c| w.board().get(c))
                    .map_or(false, |id| id_matches(w, target, id))
            }
            Predicate::MoveWas { from, to, which } => {
                let Some(mv) = t.move_at(*which) else {
                    return false;
                };
                from.resolve(t.from(), t.to()) == Some(mv.src())
                    && to.resolve(t.from(), t.to()) == Some(mv.dst())
            }
            Predicate::FirstMove { which } => match which {
                MoveState::ThisMove => t.log_len() == 1,
                MoveState::LastMove => t.log_len() == 2,
            },
            Predicate::ForEvery { rule, side } => {
                let w = t.next_state();
                let moves = w.raw_moves(*side);
                trace!("for_every: checking {} replies of {}", moves.len(), side);
                moves
                    .into_iter()
                    .map(|mv| BoardTransition::with_move(w, mv))
                    .filter(|reply| reply.is_performed())
                    .all(|reply| rule.eval(&reply))
            }
        }
    }
}

fn id_matches(w: &MoveWorker, target: &PieceMatch, id: &PieceId) -> bool {
    target.matches(id, w.registry().get(id.as_str()))
}

/// Squares holding pieces matching `target`
fn matching(w: &MoveWorker, target: &PieceMatch) -> SquareSet {
    w.board()
        .pieces()
        .filter(|(_, id)| id_matches(w, target, id))
        .map(|(c, _)| c)
        .collect()
}

/// Squares the pieces of either side can capture on
///
/// Shared pieces never move, so they attack nothing.
fn all_captures(w: &MoveWorker) -> SquareSet {
    w.captures(Color::White) | w.captures(Color::Black)
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Predicate::Const(v) => write!(f, "{}", v),
            Predicate::Not(p) => write!(f, "{}({})", Operator::Not, p),
            Predicate::Binary(op, lhs, rhs) => {
                write!(f, "{}({},{})", Operator::Binary(*op), lhs, rhs)
            }
            Predicate::Attacked { state, target } => write!(f, "attacked({},{})", state, target),
            Predicate::PiecesLeft {
                target,
                cmp,
                value,
                state,
            } => write!(f, "pieces_left({},{},{},{})", target, cmp, value, state),
            Predicate::PieceMoved { target, which } => {
                write!(f, "piece_moved({},{})", target, which)
            }
            Predicate::PieceCaptured { target, which } => {
                write!(f, "piece_captured({},{})", target, which)
            }
            Predicate::HasMoved { pos, state } => write!(f, "has_moved({},{})", pos, state),
            Predicate::HasRank { pos, value } => write!(f, "has_rank({},{})", pos, value),
            Predicate::HasFile { pos, value } => write!(f, "has_file({},{})", pos, value),
            Predicate::SquareAttacked {
                pos,
                state,
                attacker,
            } => write!(f, "square_attacked({},{},{})", pos, state, attacker),
            Predicate::SquareEmpty { pos, state } => {
                write!(f, "square_empty({},{})", pos, state)
            }
            Predicate::PieceAt { pos, target, state } => {
                write!(f, "piece_at({},{},{})", pos, target, state)
            }
            Predicate::MoveWas { from, to, which } => {
                write!(f, "move_was({},{},{})", from, to, which)
            }
            Predicate::FirstMove { which } => write!(f, "first_move({})", which),
            Predicate::ForEvery { rule, side } => write!(f, "for_every({},{})", rule, side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Anchor;
    use crate::standard;
    use chessrules_base::Coord;

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn royal(c: Color) -> PieceMatch {
        PieceMatch::Royal(c)
    }

    #[test]
    fn test_apply_arity() {
        assert_eq!(
            Predicate::apply(Operator::Not, vec![Predicate::TRUE, Predicate::FALSE]),
            Err(PredicateError::Arity {
                op: Operator::Not,
                expected: 1,
                got: 2
            })
        );
        assert_eq!(
            Predicate::apply(Operator::Binary(BinaryOp::Xor), vec![Predicate::TRUE]),
            Err(PredicateError::Arity {
                op: Operator::Binary(BinaryOp::Xor),
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            Predicate::apply(Operator::Not, vec![Predicate::TRUE]),
            Ok(Predicate::TRUE.negate())
        );
    }

    #[test]
    fn test_logic() {
        let w = standard::worker();
        let t = BoardTransition::new(&w, coord("e2"), coord("e4")).unwrap();
        for a in [false, true] {
            for b in [false, true] {
                let pa = Predicate::Const(a);
                let pb = Predicate::Const(b);
                let eval = |op| {
                    Predicate::apply(op, vec![pa.clone(), pb.clone()])
                        .unwrap()
                        .eval(&t)
                };
                assert_eq!(eval(Operator::Binary(BinaryOp::And)), a && b);
                assert_eq!(eval(Operator::Binary(BinaryOp::Or)), a || b);
                assert_eq!(eval(Operator::Binary(BinaryOp::Implies)), !a || b);
                assert_eq!(eval(Operator::Binary(BinaryOp::Xor)), a ^ b);
                assert_eq!(eval(Operator::Binary(BinaryOp::Equals)), a == b);
            }
        }
    }

    #[test]
    fn test_double_negation() {
        let w = standard::worker();
        let preds = [
            Predicate::TRUE,
            Predicate::FALSE,
            Predicate::Attacked {
                state: BoardState::NextState,
                target: PieceMatch::Any,
            },
            Predicate::SquareEmpty {
                pos: Position::relative(0, -1, Anchor::To),
                state: BoardState::NextState,
            },
        ];
        for (src, dst) in [("e2", "e4"), ("g1", "f3"), ("b2", "b3")] {
            let t = BoardTransition::new(&w, coord(src), coord(dst)).unwrap();
            for p in &preds {
                assert_eq!(p.clone().negate().negate().eval(&t), p.eval(&t));
            }
        }
    }

    #[test]
    fn test_chess_predicates() {
        let mut w = standard::worker();
        for (src, dst) in [("e2", "e4"), ("d7", "d5")] {
            w.make_move(coord(src), coord(dst)).unwrap();
        }
        let t = BoardTransition::new(&w, coord("e4"), coord("d5")).unwrap();
        let captured = Predicate::PieceCaptured {
            target: PieceMatch::Exact("p".into()),
            which: MoveState::ThisMove,
        };
        assert!(captured.eval(&t));
        let moved = Predicate::PieceMoved {
            target: PieceMatch::AnyOf(Color::White),
            which: MoveState::ThisMove,
        };
        assert!(moved.eval(&t));
        let last = Predicate::MoveWas {
            from: Position::Absolute(coord("d7")),
            to: Position::Absolute(coord("d5")),
            which: MoveState::LastMove,
        };
        assert!(last.eval(&t));
        let left = |cmp, value, state| Predicate::PiecesLeft {
            target: PieceMatch::AnyOf(Color::Black),
            cmp,
            value,
            state,
        };
        assert!(left(Comparator::Eq, 16, BoardState::ThisState).eval(&t));
        assert!(left(Comparator::Lt, 16, BoardState::NextState).eval(&t));
        assert!(Predicate::HasRank {
            pos: Position::TO,
            value: 5
        }
        .eval(&t));
        assert!(Predicate::HasFile {
            pos: Position::FROM,
            value: 5
        }
        .eval(&t));
        assert!(Predicate::HasMoved {
            pos: Position::FROM,
            state: BoardState::ThisState
        }
        .eval(&t));
        assert!(!Predicate::HasMoved {
            pos: Position::FROM,
            state: BoardState::NextState
        }
        .eval(&t));
        assert!(Predicate::PieceAt {
            pos: Position::TO,
            target: PieceMatch::Exact("P".into()),
            state: BoardState::NextState
        }
        .eval(&t));
        assert!(!Predicate::FirstMove {
            which: MoveState::ThisMove
        }
        .eval(&t));
        // The black queen recaptures on d5
        assert!(Predicate::SquareAttacked {
            pos: Position::TO,
            state: BoardState::NextState,
            attacker: PieceMatch::Exact("q".into())
        }
        .eval(&t));
    }

    #[test]
    fn test_first_move() {
        let w = standard::worker();
        let t = BoardTransition::new(&w, coord("e2"), coord("e4")).unwrap();
        let first = |which| Predicate::FirstMove { which };
        assert!(first(MoveState::ThisMove).eval(&t));
        assert!(!first(MoveState::LastMove).eval(&t));
    }

    #[test]
    fn test_attacked() {
        let reg = std::sync::Arc::new(standard::registry());
        let board = crate::board::Board::from_layout("4k3/8/8/8/8/8/8/R3K3").unwrap();
        let w = MoveWorker::new(board, reg);
        let t = BoardTransition::new(&w, coord("a1"), coord("a8")).unwrap();
        let check = Predicate::Attacked {
            state: BoardState::NextState,
            target: royal(Color::Black),
        };
        assert!(check.eval(&t));
        assert!(!Predicate::Attacked {
            state: BoardState::ThisState,
            target: royal(Color::Black),
        }
        .eval(&t));
        // The king can step off the back rank
        let escape = Predicate::ForEvery {
            rule: Box::new(check.clone()),
            side: Color::Black,
        };
        assert!(!escape.eval(&t));
    }

    #[test]
    fn test_shared_pieces_attack_nothing() {
        let wall = chessrules_base::Piece::builder("w", chessrules_base::Owner::Shared)
            .movements(chessrules_base::ORTHOGONAL.iter().map(|&(dx, dy)| {
                chessrules_base::Pattern::slide(dx, dy)
            }))
            .build();
        let reg: crate::registry::PieceRegistry =
            standard::registry().iter().cloned().chain([wall]).collect();
        let board = crate::board::Board::from_layout("4k3/8/8/8/8/8/8/w3K3").unwrap();
        let w = MoveWorker::new(board, std::sync::Arc::new(reg));
        assert!(w.raw_moves(Color::White).iter().all(|m| m.src() == coord("e1")));
        let t = BoardTransition::new(&w, coord("e1"), coord("f1")).unwrap();
        assert!(!Predicate::Attacked {
            state: BoardState::NextState,
            target: royal(Color::White),
        }
        .eval(&t));
        // Asking for the shared piece explicitly still sees its reach
        assert!(Predicate::SquareAttacked {
            pos: Position::TO,
            state: BoardState::NextState,
            attacker: PieceMatch::Exact("w".into()),
        }
        .eval(&t));
    }

    #[test]
    fn test_for_every_vacuous() {
        let reg = std::sync::Arc::new(standard::registry());
        let board = crate::board::Board::from_layout("8/8/8/8/8/8/8/R3K3").unwrap();
        let w = MoveWorker::new(board, reg);
        let t = BoardTransition::new(&w, coord("a1"), coord("a8")).unwrap();
        let p = Predicate::ForEvery {
            rule: Box::new(Predicate::FALSE),
            side: Color::Black,
        };
        assert!(p.eval(&t));
    }

    #[test]
    fn test_display() {
        let p = Predicate::Attacked {
            state: BoardState::NextState,
            target: royal(Color::Black),
        }
        .and(Predicate::ForEvery {
            rule: Box::new(Predicate::Attacked {
                state: BoardState::NextState,
                target: royal(Color::Black),
            }),
            side: Color::Black,
        });
        assert_eq!(
            p.to_string(),
            "AND(attacked(next_state,ROYAL_BLACK),for_every(attacked(next_state,ROYAL_BLACK),black))"
        );
        assert_eq!(
            Predicate::HasRank {
                pos: Position::relative(0, 1, Anchor::To),
                value: 8
            }
            .negate()
            .to_string(),
            "NOT(has_rank(relative(0,1,to),8))"
        );
    }
}
