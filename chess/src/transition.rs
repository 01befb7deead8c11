//! Board transitions, i.e. pairs of states connected by a move

use crate::moves::{GameEvent, Move};
use crate::types::{BoardState, MoveState};
use crate::worker::{MoveError, MoveWorker};

use chessrules_base::Coord;

/// State before a move, the state after it and the move itself
///
/// The state after the move is an independent fork of the state before it, with the move
/// forcibly performed. If performing fails, the fork keeps whatever the actions managed to
/// change, and [`BoardTransition::is_performed()`] returns `false`.
#[derive(Debug, Clone)]
pub struct BoardTransition<'a> {
    this_state: &'a MoveWorker,
    next_state: MoveWorker,
    mv: Move,
    result: Result<Vec<GameEvent>, MoveError>,
}

impl<'a> BoardTransition<'a> {
    /// Creates a transition for a plain move from `src` to `dst`
    ///
    /// The moving side is the owner of the piece on `src`. The destination is not checked
    /// against the piece patterns.
    pub fn new(worker: &'a MoveWorker, src: Coord, dst: Coord) -> Result<Self, MoveError> {
        if worker.board().is_free(src) {
            return Err(MoveError::NoPiece(src));
        }
        let piece = worker.piece_at(src).ok_or(MoveError::UnknownPiece(src))?;
        let side = piece.owner().color().ok_or(MoveError::NotOwned(src))?;
        Ok(Self::with_move(worker, Move::new(src, dst, side)))
    }

    /// Creates a transition for the given move
    pub fn with_move(worker: &'a MoveWorker, mv: Move) -> Self {
        let mut next_state = worker.fork();
        let result = next_state.perform(mv.clone(), true);
        let mv = match result {
            Ok(_) => next_state.last_move().cloned().unwrap_or(mv),
            Err(_) => mv,
        };
        BoardTransition {
            this_state: worker,
            next_state,
            mv,
            result,
        }
    }

    #[inline]
    pub fn this_state(&self) -> &'a MoveWorker {
        self.this_state
    }

    #[inline]
    pub fn next_state(&self) -> &MoveWorker {
        &self.next_state
    }

    pub fn state(&self, which: BoardState) -> &MoveWorker {
        match which {
            BoardState::ThisState => self.this_state,
            BoardState::NextState => &self.next_state,
        }
    }

    /// The move connecting the states
    ///
    /// If the move was performed successfully, the moving and captured pieces are filled in.
    #[inline]
    pub fn mv(&self) -> &Move {
        &self.mv
    }

    #[inline]
    pub fn from(&self) -> Coord {
        self.mv.src()
    }

    #[inline]
    pub fn to(&self) -> Coord {
        self.mv.dst()
    }

    #[inline]
    pub fn is_performed(&self) -> bool {
        self.result.is_ok()
    }

    /// Result of performing the move
    #[inline]
    pub fn result(&self) -> &Result<Vec<GameEvent>, MoveError> {
        &self.result
    }

    /// Returns the move selected by `which`
    ///
    /// `ThisMove` is the move of this transition, `LastMove` is the move performed before it.
    /// If performing the move failed, there is no `ThisMove`.
    pub fn move_at(&self, which: MoveState) -> Option<&Move> {
        match (which, self.is_performed()) {
            (MoveState::ThisMove, true) => Some(&self.mv),
            (MoveState::ThisMove, false) => None,
            (MoveState::LastMove, _) => self.this_state.last_move(),
        }
    }

    /// Length of the move log after the transition
    #[inline]
    pub fn log_len(&self) -> usize {
        self.next_state.log().len()
    }

    /// Consumes the transition, returning the state after the move
    pub fn into_next_state(self) -> MoveWorker {
        self.next_state
    }
}
