//! # Declarative rule engine for chess variants
//!
//! Pieces are described by movement patterns, while everything else about a variant (which
//! moves are legal, special moves, promotions, how the game ends) is expressed with predicates
//! over board transitions. Predicates can be built directly or compiled from a small rule
//! language, see [`parser`].
//!
//! [`standard`] contains orthodox chess built this way.

pub mod board;
pub mod event;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod parser;
pub mod position;
pub mod predicate;
pub mod registry;
pub mod ruleset;
pub mod standard;
pub mod template;
pub mod transition;
pub mod types;
pub mod worker;

pub use board::Board;
pub use event::Event;
pub use game::{Game, GameError};
pub use movegen::MoveList;
pub use moves::{Action, GameEvent, Move};
pub use position::{Anchor, Position};
pub use predicate::Predicate;
pub use registry::PieceRegistry;
pub use ruleset::RuleSet;
pub use template::MoveTemplate;
pub use transition::BoardTransition;
pub use types::{BoardState, Comparator, MoveState, Outcome};
pub use worker::{MoveError, MoveWorker};

pub use chessrules_base::{Color, Coord, Owner, Pattern, Piece, PieceId, SquareSet};
