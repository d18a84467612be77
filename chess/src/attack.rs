//! Attack detection

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen;
use crate::types::{Color, Square};

/// Returns the pieces of color `by` that can reach `sq` with a pseudo-legal move
///
/// For an occupied `sq` this is exactly the set of pieces attacking it, as a pawn can only step
/// forward onto an empty square.
pub fn attackers(b: &Board, sq: Square, by: Color) -> Bitboard {
    b.color(by)
        .into_iter()
        .filter(|&src| movegen::pseudo_legal(b, src).has(sq))
        .collect()
}

/// Returns `true` if some piece of color `by` can reach `sq` with a pseudo-legal move
///
/// Pseudo-legal generation is used on purpose, so this function never needs to consult
/// legality and can be used from inside the legality filter.
pub fn is_attacked(b: &Board, sq: Square, by: Color) -> bool {
    b.color(by)
        .into_iter()
        .any(|src| movegen::pseudo_legal(b, src).has(sq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert!(!is_attacked(&b, b.king_pos(Color::White), Color::Black));
        assert!(!is_attacked(&b, b.king_pos(Color::Black), Color::White));
        assert!(is_attacked(&b, sq("f3"), Color::White));
        assert!(!is_attacked(&b, sq("e4"), Color::Black));
    }

    #[test]
    fn test_attackers() {
        let b = Board::from_placement("4k3/8/8/7b/8/3p4/4K3/8").unwrap();
        let king = b.king_pos(Color::White);
        assert!(is_attacked(&b, king, Color::Black));
        assert_eq!(
            attackers(&b, king, Color::Black),
            Bitboard::EMPTY.with(sq("h5")).with(sq("d3"))
        );

        // A piece in between blocks the ray
        let b = Board::from_placement("4k3/8/8/1b6/2N5/8/4K3/8").unwrap();
        assert!(!is_attacked(&b, b.king_pos(Color::White), Color::Black));
    }

    #[test]
    fn test_pawn_push_is_not_attack() {
        let b = Board::from_placement("4k3/8/8/8/8/4p3/8/4K3").unwrap();
        assert!(!is_attacked(&b, sq("e1"), Color::Black));
        assert!(!is_attacked(&b, sq("d1"), Color::Black));
        let b = Board::from_placement("4k3/8/8/8/8/8/4p3/4K3").unwrap();
        assert!(!is_attacked(&b, b.king_pos(Color::White), Color::Black));
    }
}
