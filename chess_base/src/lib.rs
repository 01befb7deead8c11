//! # Base types for chessrules
//!
//! This is an auxiliary crate for `chessrules`, which contains the piece model: coordinates,
//! square sets, movement patterns and piece kinds. It is split from the main crate, so piece
//! catalogs can be loaded and stored without pulling in the rule engine.
//!
//! Normally you don't want to use this crate directly. Use `chessrules` instead.

pub mod piece;
pub mod record;
pub mod squareset;
pub mod types;

pub use piece::{
    Pattern, PatternError, Piece, PieceBuilder, PieceId, DIAGONAL, KNIGHT_JUMPS, ORTHOGONAL,
};
pub use record::{PatternRecord, PieceRecord, PieceRecordError};
pub use squareset::SquareSet;
pub use types::{Color, ColorParseError, Coord, CoordParseError, Owner};
