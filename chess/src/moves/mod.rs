mod action;
mod base;

pub mod notation;

pub use action::*;
pub use base::*;
pub use notation::{Notation, NotationError};
