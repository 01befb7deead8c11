use crate::types::Coord;
use std::fmt;
use std::iter::FromIterator;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

const WORDS: usize = (Coord::COUNT + 63) / 64;
const LAST_MASK: u64 = (1_u64 << (Coord::COUNT % 64)) - 1;

/// Set of squares, one bit per [`Coord`]
///
/// The set is keyed by [`Coord::index()`], so it does not depend on the board dimensions and
/// can be combined freely between boards of different sizes.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SquareSet([u64; WORDS]);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet([0; WORDS]);

    pub const fn from_coord(coord: Coord) -> SquareSet {
        SquareSet::EMPTY.with(coord)
    }

    pub const fn with(self, coord: Coord) -> SquareSet {
        let mut words = self.0;
        words[coord.index() / 64] |= 1_u64 << (coord.index() % 64);
        SquareSet(words)
    }

    pub const fn without(self, coord: Coord) -> SquareSet {
        let mut words = self.0;
        words[coord.index() / 64] &= !(1_u64 << (coord.index() % 64));
        SquareSet(words)
    }

    pub fn set(&mut self, coord: Coord) {
        *self = self.with(coord);
    }

    pub fn unset(&mut self, coord: Coord) {
        *self = self.without(coord);
    }

    pub const fn has(&self, coord: Coord) -> bool {
        (self.0[coord.index() / 64] >> (coord.index() % 64)) & 1 != 0
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub fn is_nonempty(&self) -> bool {
        !self.is_empty()
    }

    pub fn iter(&self) -> Iter {
        Iter {
            words: self.0,
            pos: 0,
        }
    }
}

macro_rules! impl_bitop {
    ($trait:ident, $fn:ident, $assign_trait:ident, $assign_fn:ident, $op:tt) => {
        impl $trait for SquareSet {
            type Output = SquareSet;

            #[inline]
            fn $fn(mut self, rhs: SquareSet) -> SquareSet {
                for (a, b) in self.0.iter_mut().zip(rhs.0) {
                    *a = *a $op b;
                }
                self
            }
        }

        impl $assign_trait for SquareSet {
            #[inline]
            fn $assign_fn(&mut self, rhs: SquareSet) {
                *self = $trait::$fn(*self, rhs);
            }
        }
    };
}

impl_bitop!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bitop!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bitop!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for SquareSet {
    type Output = SquareSet;

    fn not(mut self) -> SquareSet {
        for w in &mut self.0 {
            *w = !*w;
        }
        self.0[WORDS - 1] &= LAST_MASK;
        self
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "SquareSet({})", self)
    }
}

impl fmt::Display for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, c) in self.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

pub struct Iter {
    words: [u64; WORDS],
    pos: usize,
}

impl Iterator for Iter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        while self.pos < WORDS {
            let w = &mut self.words[self.pos];
            if *w != 0 {
                let bit = w.trailing_zeros() as usize;
                *w &= w.wrapping_sub(1_u64);
                return Some(Coord::from_index(self.pos * 64 + bit));
            }
            self.pos += 1;
        }
        None
    }
}

impl IntoIterator for SquareSet {
    type Item = Coord;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl FromIterator<Coord> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> SquareSet {
        let mut res = SquareSet::EMPTY;
        for c in iter {
            res.set(c);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter() {
        let set = SquareSet::EMPTY
            .with(Coord::from_parts(0, 3))
            .with(Coord::from_parts(4, 1))
            .with(Coord::from_parts(19, 19));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                Coord::from_parts(4, 1),
                Coord::from_parts(0, 3),
                Coord::from_parts(19, 19)
            ],
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_bitops() {
        let ca = Coord::from_parts(0, 3);
        let cb = Coord::from_parts(4, 1);
        let cc = Coord::from_parts(15, 12);

        let s1 = SquareSet::EMPTY.with(ca).with(cb);
        let s2 = SquareSet::EMPTY.with(cb).with(cc);
        assert_eq!(s1 & s2, SquareSet::from_coord(cb));
        assert_eq!(s1 | s2, SquareSet::EMPTY.with(ca).with(cb).with(cc));
        assert_eq!(s1 ^ s2, SquareSet::EMPTY.with(ca).with(cc));

        assert_eq!((!s1).len(), Coord::COUNT - 2);
        assert_eq!((!SquareSet::EMPTY).iter().count(), Coord::COUNT);
        assert!((s1 & !s1).is_empty());
    }

    #[test]
    fn test_format() {
        let set: SquareSet = ["e4", "a1", "t20"]
            .iter()
            .map(|s| s.parse::<Coord>().unwrap())
            .collect();
        assert_eq!(set.to_string(), "a1 e4 t20");
    }
}
