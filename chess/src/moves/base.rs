use super::action::Action;

use chessrules_base::{Color, Coord, PieceId};

use std::fmt;
use std::sync::Arc;

static DEFAULT_ACTIONS: [Action; 1] = [Action::MOVE];

/// Move on the board
///
/// A move connects two squares and carries an ordered list of actions to perform. Plain moves
/// generated from piece patterns use the default list, which just moves the piece from the source
/// to the destination. Special moves (castling, en passant and so on) carry their own lists.
///
/// The moving piece and the captured piece are not known upon construction. They are filled in
/// when the move is performed by a [`MoveWorker`](crate::worker::MoveWorker), so they are only
/// available on moves taken from the worker log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    src: Coord,
    dst: Coord,
    side: Color,
    actions: Option<Arc<[Action]>>,
    piece: Option<PieceId>,
    captured: Option<PieceId>,
}

impl Move {
    /// Creates a plain move
    pub fn new(src: Coord, dst: Coord, side: Color) -> Move {
        Move {
            src,
            dst,
            side,
            actions: None,
            piece: None,
            captured: None,
        }
    }

    /// Creates a move with a custom action list
    pub fn with_actions(src: Coord, dst: Coord, side: Color, actions: Arc<[Action]>) -> Move {
        Move {
            actions: Some(actions),
            ..Move::new(src, dst, side)
        }
    }

    #[inline]
    pub fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        match &self.actions {
            Some(a) => &a[..],
            None => &DEFAULT_ACTIONS[..],
        }
    }

    /// Returns `true` if the move carries its own action list
    #[inline]
    pub fn is_special(&self) -> bool {
        self.actions.is_some()
    }

    /// Piece that stood on the source square when the move was performed
    #[inline]
    pub fn piece(&self) -> Option<&PieceId> {
        self.piece.as_ref()
    }

    /// Piece removed from the board while performing the move
    #[inline]
    pub fn captured(&self) -> Option<&PieceId> {
        self.captured.as_ref()
    }

    pub(crate) fn set_performed(&mut self, piece: Option<PieceId>, captured: Option<PieceId>) {
        self.piece = piece;
        self.captured = captured;
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)
    }
}
