use crate::types::Square;
use derive_more::{BitAnd, BitOr};
use std::fmt;
use std::iter::{FromIterator, IntoIterator};

/// Set of squares
///
/// Bit `i` is set iff the square with index `i` belongs to the set. Every generator in the
/// engine returns its destinations as a `Bitboard`.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitOr,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1_u64 << sq.index()))
    }

    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << sq.index()))
    }

    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    pub fn unset(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    pub const fn has(&self, sq: Square) -> bool {
        ((self.0 >> sq.index()) & 1) != 0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let v = self.0.reverse_bits();
        write!(
            f,
            "{:08b}/{:08b}/{:08b}/{:08b}/{:08b}/{:08b}/{:08b}/{:08b}",
            (v >> 56) & 0xff,
            (v >> 48) & 0xff,
            (v >> 40) & 0xff,
            (v >> 32) & 0xff,
            (v >> 24) & 0xff,
            (v >> 16) & 0xff,
            (v >> 8) & 0xff,
            v & 0xff,
        )
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        unsafe { Some(Square::from_index_unchecked(bit as usize)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut res = Bitboard::EMPTY;
        for sq in iter {
            res.set(sq);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank, Square};

    #[test]
    fn test_iter() {
        let bb = Bitboard::EMPTY
            .with(Square::from_parts(File::A, Rank::R4))
            .with(Square::from_parts(File::E, Rank::R2))
            .with(Square::from_parts(File::F, Rank::R3));
        assert_eq!(
            bb.into_iter().collect::<Vec<_>>(),
            vec![
                Square::from_parts(File::A, Rank::R4),
                Square::from_parts(File::F, Rank::R3),
                Square::from_parts(File::E, Rank::R2)
            ],
        );
        assert_eq!(bb.into_iter().collect::<Bitboard>(), bb);
    }

    #[test]
    fn test_bitops() {
        let sa = Square::from_parts(File::A, Rank::R4);
        let sb = Square::from_parts(File::E, Rank::R2);
        let sc = Square::from_parts(File::F, Rank::R3);

        let bb1 = Bitboard::EMPTY.with(sa).with(sb);
        let bb2 = Bitboard::EMPTY.with(sb).with(sc);
        assert_eq!(bb1 & bb2, Bitboard::EMPTY.with(sb));
        assert_eq!(bb1 | bb2, Bitboard::EMPTY.with(sa).with(sb).with(sc));
        assert_eq!((bb1 | bb2).into_iter().len(), 3);
        assert_eq!((bb1 | bb2).len(), 3);
        assert!(bb1.without(sa).without(sb).is_empty());
    }

    #[test]
    fn test_format() {
        let bb = Bitboard::EMPTY
            .with(Square::from_parts(File::A, Rank::R4))
            .with(Square::from_parts(File::E, Rank::R2))
            .with(Square::from_parts(File::F, Rank::R3))
            .with(Square::from_parts(File::H, Rank::R8));
        assert_eq!(
            bb.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000100/00001000/00000000"
        );
    }
}
