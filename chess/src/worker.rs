//! Live game state with move execution and undo

use crate::board::Board;
use crate::movegen::{self, MoveList, Reach};
use crate::moves::{Action, ActionError, GameEvent, Move};
use crate::registry::PieceRegistry;

use chessrules_base::{Color, Coord, Piece, SquareSet};

use std::collections::BTreeMap;
use std::sync::Arc;

use log::trace;
use thiserror::Error;

/// Error making a move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// Source square is free
    #[error("no piece on {0}")]
    NoPiece(Coord),
    /// Piece on the source square is not in the registry
    #[error("unknown piece on {0}")]
    UnknownPiece(Coord),
    /// Piece on the source square cannot be moved by anyone
    #[error("piece on {0} belongs to no side")]
    NotOwned(Coord),
    /// Destination is not reachable by the piece
    #[error("move {src}{dst} is not reachable")]
    NotReachable { src: Coord, dst: Coord },
    /// One of the move actions failed
    #[error("action #{} failed: {}", .index + 1, .source)]
    Action { index: usize, source: ActionError },
    /// Move log is too short to hold the requested move
    #[error("no move {0} moves back in the log")]
    NoPivot(usize),
}

/// Board together with the piece registry and the move history
///
/// Each performed move pushes a snapshot of the board before it, so the move can be undone.
#[derive(Debug, Clone)]
pub struct MoveWorker {
    board: Board,
    registry: Arc<PieceRegistry>,
    log: Vec<Move>,
    states: Vec<Board>,
}

impl MoveWorker {
    pub fn new(board: Board, registry: Arc<PieceRegistry>) -> MoveWorker {
        MoveWorker {
            board,
            registry,
            log: Vec::new(),
            states: Vec::new(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    /// Performed moves, oldest first
    #[inline]
    pub fn log(&self) -> &[Move] {
        &self.log
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.log.last()
    }

    /// Returns the move performed `back` moves ago, where zero means the last one
    pub fn move_back(&self, back: usize) -> Option<&Move> {
        self.log.iter().rev().nth(back)
    }

    /// Returns the piece kind standing on the square, if it is known
    pub fn piece_at(&self, c: Coord) -> Option<&Piece> {
        self.board
            .get(c)
            .and_then(|id| self.registry.get(id.as_str()))
    }

    /// Plain moves and captures of the piece on `src`
    pub fn reach(&self, src: Coord) -> Reach {
        movegen::reach(&self.board, &self.registry, src)
    }

    /// All the raw moves of `side`, ignoring legality rules
    pub fn raw_moves(&self, side: Color) -> MoveList {
        movegen::raw_moves(&self.board, &self.registry, side)
    }

    /// All the squares `side` can capture on
    pub fn captures(&self, side: Color) -> SquareSet {
        movegen::capture_set(&self.board, &self.registry, side)
    }

    /// Destination sets of all the pieces of `side` which can move
    pub fn move_map(&self, side: Color) -> BTreeMap<Coord, SquareSet> {
        let mut res = BTreeMap::new();
        for mv in self.raw_moves(side) {
            res.entry(mv.src())
                .or_insert(SquareSet::EMPTY)
                .set(mv.dst());
        }
        res
    }

    /// Creates an independent copy for hypothetical moves
    ///
    /// The copy shares nothing mutable with the original. Its undo stack starts empty, so
    /// it cannot undo moves made before the fork.
    pub fn fork(&self) -> MoveWorker {
        MoveWorker {
            board: self.board.clone(),
            registry: Arc::clone(&self.registry),
            log: self.log.clone(),
            states: Vec::new(),
        }
    }

    fn validate(&self, src: Coord, dst: Coord) -> Result<Color, MoveError> {
        if self.board.is_free(src) {
            return Err(MoveError::NoPiece(src));
        }
        let piece = self.piece_at(src).ok_or(MoveError::UnknownPiece(src))?;
        let side = piece.owner().color().ok_or(MoveError::NotOwned(src))?;
        if !self.reach(src).all().has(dst) {
            return Err(MoveError::NotReachable { src, dst });
        }
        Ok(side)
    }

    /// Makes a plain move from `src` to `dst`, validating it against the piece patterns
    pub fn make_move(&mut self, src: Coord, dst: Coord) -> Result<Vec<GameEvent>, MoveError> {
        let side = self.validate(src, dst)?;
        self.perform(Move::new(src, dst, side), true)
    }

    /// Performs the move
    ///
    /// Unless `forced` is set, the destination must be reachable by the piece on the source
    /// square. The actions run in order, and the first failing action aborts the move.
    /// Actions performed before the failing one are not rolled back, and the move is not
    /// logged in this case.
    pub fn perform(&mut self, mut mv: Move, forced: bool) -> Result<Vec<GameEvent>, MoveError> {
        if !forced {
            self.validate(mv.src(), mv.dst())?;
        }
        self.states.push(self.board.clone());
        let piece = self.board.get(mv.src()).cloned();
        let mut captured = None;
        let mut events = Vec::new();
        for (index, action) in mv.actions().iter().enumerate() {
            match action.perform(
                &mut self.board,
                mv.src(),
                mv.dst(),
                piece.as_ref(),
                &mut captured,
            ) {
                Ok(Some(ev)) => events.push(ev),
                Ok(None) => {}
                Err(source) => {
                    self.states.pop();
                    return Err(MoveError::Action { index, source });
                }
            }
        }
        trace!("performed {} ({} actions)", mv, mv.actions().len());
        mv.set_performed(piece, captured);
        self.log.push(mv);
        Ok(events)
    }

    /// Runs the actions against the live board without logging a move
    ///
    /// Positions resolve against `from` and `to`. Same as with [`MoveWorker::perform()`], the
    /// actions preceding a failed one stay applied.
    pub fn run_actions(
        &mut self,
        actions: &[Action],
        from: Coord,
        to: Coord,
    ) -> Result<Vec<GameEvent>, MoveError> {
        let mut captured = None;
        let mut events = Vec::new();
        for (index, action) in actions.iter().enumerate() {
            if let Some(ev) = action
                .perform(&mut self.board, from, to, None, &mut captured)
                .map_err(|source| MoveError::Action { index, source })?
            {
                events.push(ev);
            }
        }
        Ok(events)
    }

    /// Undoes the last move, restoring the board snapshot taken before it
    pub fn undo(&mut self) -> Option<Move> {
        let board = self.states.pop()?;
        self.board = board;
        self.log.pop()
    }
}
