//! Plain records mirroring the piece model, used for persistence
//!
//! Records keep the loose shape pieces are stored in, with all validation deferred to the
//! conversion into [`Piece`] and [`Pattern`].

use crate::piece::{Pattern, PatternError, Piece, PieceId};
use crate::types::Owner;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PieceRecordError {
    /// Bad movement pattern
    #[error("bad movement pattern #{}: {}", .index + 1, .source)]
    Movement { index: usize, source: PatternError },
    /// Bad capture pattern
    #[error("bad capture pattern #{}: {}", .index + 1, .source)]
    Capture { index: usize, source: PatternError },
    /// Unknown owner string
    #[error("unknown owner {0:?}")]
    Owner(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternRecord {
    pub x_dir: i8,
    pub y_dir: i8,
    pub min_length: u8,
    /// Zero means unbounded
    pub max_length: u8,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub jump: bool,
}

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !*b
}

impl From<Pattern> for PatternRecord {
    fn from(p: Pattern) -> PatternRecord {
        match p {
            Pattern::Regular { dx, dy, min, max } => PatternRecord {
                x_dir: dx,
                y_dir: dy,
                min_length: min,
                max_length: max.unwrap_or(0),
                jump: false,
            },
            Pattern::Jump { dx, dy } => PatternRecord {
                x_dir: dx,
                y_dir: dy,
                min_length: 1,
                max_length: 1,
                jump: true,
            },
        }
    }
}

impl TryFrom<PatternRecord> for Pattern {
    type Error = PatternError;

    fn try_from(r: PatternRecord) -> Result<Pattern, PatternError> {
        if r.jump {
            return Pattern::jump(r.x_dir, r.y_dir);
        }
        let max = match r.max_length {
            0 => None,
            m => Some(m),
        };
        Pattern::regular(r.x_dir, r.y_dir, r.min_length, max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PieceRecord {
    pub identifier: String,
    pub belongs_to: String,
    pub movements: Vec<PatternRecord>,
    pub captures: Vec<PatternRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub royal: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repeat: u8,
    #[cfg_attr(feature = "serde", serde(default = "default_capturable"))]
    pub capturable: bool,
}

#[cfg(feature = "serde")]
fn default_capturable() -> bool {
    true
}

fn owner_str(owner: Owner) -> &'static str {
    match owner {
        Owner::White => "white",
        Owner::Black => "black",
        Owner::Shared => "shared",
    }
}

impl From<Piece> for PieceRecord {
    fn from(p: Piece) -> PieceRecord {
        PieceRecord {
            identifier: p.id().to_string(),
            belongs_to: owner_str(p.owner()).to_string(),
            movements: p.movements().iter().copied().map(Into::into).collect(),
            captures: p.captures().iter().copied().map(Into::into).collect(),
            royal: p.is_royal(),
            repeat: p.repeat(),
            capturable: p.is_capturable(),
        }
    }
}

impl TryFrom<PieceRecord> for Piece {
    type Error = PieceRecordError;

    fn try_from(r: PieceRecord) -> Result<Piece, PieceRecordError> {
        let owner = match r.belongs_to.as_str() {
            "white" => Owner::White,
            "black" => Owner::Black,
            "shared" => Owner::Shared,
            _ => return Err(PieceRecordError::Owner(r.belongs_to)),
        };
        let movements = r
            .movements
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                Pattern::try_from(p).map_err(|source| PieceRecordError::Movement { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let captures = r
            .captures
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                Pattern::try_from(p).map_err(|source| PieceRecordError::Capture { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Piece::builder(PieceId::new(r.identifier), owner)
            .movements(movements)
            .captures(captures)
            .repeat(r.repeat)
            .royal(r.royal)
            .capturable(r.capturable)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Piece {
        Piece::builder("N", Owner::White)
            .movements(
                crate::piece::KNIGHT_JUMPS
                    .iter()
                    .map(|&(dx, dy)| Pattern::jump(dx, dy).unwrap()),
            )
            .build()
    }

    #[test]
    fn test_record_conversion() {
        let rec = PieceRecord::from(knight());
        assert_eq!(rec.belongs_to, "white");
        assert!(rec.movements.iter().all(|p| p.jump));
        assert_eq!(Piece::try_from(rec), Ok(knight()));

        let bad = PieceRecord {
            identifier: "x".into(),
            belongs_to: "green".into(),
            movements: Vec::new(),
            captures: Vec::new(),
            royal: false,
            repeat: 0,
            capturable: true,
        };
        assert_eq!(
            Piece::try_from(bad),
            Err(PieceRecordError::Owner("green".into()))
        );
    }

    #[test]
    fn test_bad_pattern() {
        let rec = PieceRecord {
            identifier: "x".into(),
            belongs_to: "shared".into(),
            movements: vec![PatternRecord {
                x_dir: 1,
                y_dir: 0,
                min_length: 1,
                max_length: 0,
                jump: false,
            }],
            captures: vec![PatternRecord {
                x_dir: 0,
                y_dir: 0,
                min_length: 1,
                max_length: 1,
                jump: false,
            }],
            royal: false,
            repeat: 9,
            capturable: true,
        };
        assert_eq!(
            Piece::try_from(rec).unwrap_err().to_string(),
            "bad capture pattern #1: pattern direction must be non-zero"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let json = r#"{
            "identifier": "K",
            "belongs_to": "white",
            "movements": [{"x_dir": 1, "y_dir": 0, "min_length": 1, "max_length": 1}],
            "captures": [],
            "royal": true,
            "repeat": 7
        }"#;
        let piece: Piece = serde_json::from_str(json).unwrap();
        assert!(piece.is_royal());
        assert!(piece.is_capturable());
        assert_eq!(piece.repeat(), Piece::MAX_REPEAT);
        assert_eq!(piece.movements(), &[Pattern::step(1, 0)]);
        assert!(piece.captures().is_empty());

        let back: Piece = serde_json::from_str(&serde_json::to_string(&piece).unwrap()).unwrap();
        assert_eq!(back, piece);
    }
}
