use crate::board::Board;
use crate::position::Position;
use crate::types::Outcome;

use chessrules_base::{Color, Coord, PieceId};

use thiserror::Error;

/// Error performing an [`Action`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ActionError {
    /// Position resolves outside the board
    #[error("position {0} is off the board")]
    OffBoard(Position),
    /// Nothing to move on the source square
    #[error("no piece to move on {0}")]
    EmptySource(Coord),
}

/// Notification reported by actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// The given side wins
    Win(Color),
    /// The game is tied
    Tie,
    /// The piece on the square is to be promoted
    Promotion(Coord),
}

impl GameEvent {
    /// Returns the game outcome if the event is terminal
    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            GameEvent::Win(side) => Some(Outcome::Win { side }),
            GameEvent::Tie => Some(Outcome::Tie),
            GameEvent::Promotion(_) => None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }
}

/// Side effect applied to the board
///
/// All the positions are resolved against the endpoints of the move the action belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Moves a piece, capturing whatever stands on the destination
    MovePiece { from: Position, to: Position },
    /// Puts a piece on the square, capturing the previous occupant
    SetPiece { at: Position, piece: PieceId },
    /// Removes a piece from the square
    DeletePiece { at: Position },
    /// Declares the winner
    Win(Color),
    /// Declares a tie
    Tie,
    /// Requests promotion of the piece on the square
    Promote { at: Position },
}

impl Action {
    /// Moves the piece from the move source to the move destination
    pub const MOVE: Action = Action::MovePiece {
        from: Position::FROM,
        to: Position::TO,
    };

    /// Performs the action on the board
    ///
    /// The first piece removed by the action is stored into `captured`, unless it is already set.
    /// Removing a piece with the same identifier as `mover` is not a capture, so replacing the
    /// moved piece (as in promotion) leaves `captured` intact. When the action fails, the board
    /// is left untouched.
    pub fn perform(
        &self,
        b: &mut Board,
        from: Coord,
        to: Coord,
        mover: Option<&PieceId>,
        captured: &mut Option<PieceId>,
    ) -> Result<Option<GameEvent>, ActionError> {
        let resolve = |p: &Position| {
            p.resolve(from, to)
                .filter(|&c| b.contains(c))
                .ok_or(ActionError::OffBoard(*p))
        };
        match self {
            Action::MovePiece {
                from: src,
                to: dst,
            } => {
                let (src, dst) = (resolve(src)?, resolve(dst)?);
                if src == dst {
                    return match b.get(src) {
                        Some(_) => Ok(None),
                        None => Err(ActionError::EmptySource(src)),
                    };
                }
                let piece = b.take(src).ok_or(ActionError::EmptySource(src))?;
                let victim = b.put(dst, Some(piece));
                b.set_moved(src, false);
                b.set_moved(dst, true);
                record(captured, victim, mover);
                Ok(None)
            }
            Action::SetPiece { at, piece } => {
                let at = resolve(at)?;
                let victim = b.put(at, Some(piece.clone()));
                b.set_moved(at, true);
                record(captured, victim, mover);
                Ok(None)
            }
            Action::DeletePiece { at } => {
                let at = resolve(at)?;
                let victim = b.take(at);
                b.set_moved(at, false);
                record(captured, victim, mover);
                Ok(None)
            }
            Action::Win(side) => Ok(Some(GameEvent::Win(*side))),
            Action::Tie => Ok(Some(GameEvent::Tie)),
            Action::Promote { at } => Ok(Some(GameEvent::Promotion(resolve(at)?))),
        }
    }
}

fn record(captured: &mut Option<PieceId>, victim: Option<PieceId>, mover: Option<&PieceId>) {
    if captured.is_none() && victim.as_ref() != mover {
        *captured = victim;
    }
}
