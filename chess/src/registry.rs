//! Piece registry

use chessrules_base::{Piece, PieceId};

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RegistryError {
    /// Piece with the same identifier is already registered
    #[error("duplicate piece {0}")]
    Duplicate(PieceId),
}

/// Mapping from piece identifiers to piece kinds
///
/// Boards may hold identifiers which are absent from the registry. Such pieces never move
/// and are never captured.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PieceRegistry {
    pieces: HashMap<PieceId, Piece>,
}

impl PieceRegistry {
    pub fn new() -> PieceRegistry {
        PieceRegistry::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Piece> {
        self.pieces.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.pieces.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }
}

impl FromIterator<Piece> for PieceRegistry {
    /// Collects the pieces, later duplicates replacing earlier ones
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> PieceRegistry {
        PieceRegistry {
            pieces: iter.into_iter().map(|p| (p.id().clone(), p)).collect(),
        }
    }
}

/// Builder for [`PieceRegistry`]
///
/// Besides collecting the pieces, the builder hands out identifiers for custom pieces
/// created during one authoring session.
#[derive(Debug, Default, Clone)]
pub struct RegistryBuilder {
    pieces: HashMap<PieceId, Piece>,
    next_custom: u32,
}

impl RegistryBuilder {
    pub fn new() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn add(&mut self, piece: Piece) -> Result<&mut Self, RegistryError> {
        if self.pieces.contains_key(piece.id()) {
            return Err(RegistryError::Duplicate(piece.id().clone()));
        }
        self.pieces.insert(piece.id().clone(), piece);
        Ok(self)
    }

    /// Returns a fresh identifier of the form `custom_N`
    ///
    /// Identifiers already taken in this builder are skipped.
    pub fn next_custom_id(&mut self) -> PieceId {
        loop {
            self.next_custom += 1;
            let id = PieceId::new(format!("custom_{}", self.next_custom));
            if !self.pieces.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn build(self) -> PieceRegistry {
        PieceRegistry {
            pieces: self.pieces,
        }
    }
}
