//! Legal move filtering and checkmate detection

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::moves::{Move, ValidateError};
use crate::types::{Color, PieceKind, Square};
use crate::{attack, movegen};

use std::ops::Deref;
use std::slice;

use arrayvec::ArrayVec;

/// List of legal moves of one side
///
/// No position reachable in a game has more than 218 legal moves, so the list never
/// allocates.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

// Plays `src -> dst` on a scratch copy and checks that the mover's king is safe afterwards.
fn is_safe_after(b: &Board, src: Square, dst: Square, side: Color) -> bool {
    let mut scratch = b.clone();
    scratch.relocate(src, dst);
    !attack::is_attacked(&scratch, scratch.king_pos(side), side.inv())
}

fn holds_king(b: &Board, sq: Square) -> bool {
    matches!(b.get(sq), Some(p) if p.kind == PieceKind::King)
}

/// Returns the legal destinations of the piece on `src`
///
/// Returns an empty set if `src` doesn't hold a piece of color `side`.
///
/// The position is assumed to be reachable through [`BaseGame`](crate::game::BaseGame), where
/// the opponent's king is never under attack on `side`'s turn. On a hand-made board that breaks
/// this, squares holding a king are still left out, so a king can never be captured.
pub fn legal_moves(b: &Board, src: Square, side: Color) -> Bitboard {
    match b.get(src) {
        Some(p) if p.color == side => {}
        _ => return Bitboard::EMPTY,
    }
    movegen::pseudo_legal(b, src)
        .into_iter()
        .filter(|&dst| !holds_king(b, dst) && is_safe_after(b, src, dst, side))
        .collect()
}

/// Checks that `side` may move the piece from `src` to `dst`, and builds the move
///
/// The error tells apart a destination the piece can't reach at all
/// ([`ValidateError::IllegalDestination`]) from a destination which is reachable, but leaves
/// the king under attack ([`ValidateError::KingExposed`]).
pub fn validate(b: &Board, src: Square, dst: Square, side: Color) -> Result<Move, ValidateError> {
    let piece = b.get(src).ok_or(ValidateError::EmptySquare(src))?;
    if piece.color != side {
        return Err(ValidateError::WrongTurn(src));
    }
    if !movegen::pseudo_legal(b, src).has(dst) || holds_king(b, dst) {
        return Err(ValidateError::IllegalDestination { src, dst });
    }
    if !is_safe_after(b, src, dst, side) {
        return Err(ValidateError::KingExposed { src, dst });
    }
    Ok(Move::new(src, dst, piece, b.get(dst)))
}

/// Returns all the legal moves of `side`
pub fn gen_all(b: &Board, side: Color) -> MoveList {
    let mut res = MoveList::new();
    for (src, piece) in b.pieces(side) {
        for dst in legal_moves(b, src, side) {
            res.0.push(Move::new(src, dst, piece, b.get(dst)));
        }
    }
    res
}

/// Returns `true` if `side` has at least one legal move
pub fn has_legal_moves(b: &Board, side: Color) -> bool {
    b.pieces(side)
        .any(|(src, _)| legal_moves(b, src, side).is_nonempty())
}

/// Returns `true` if the king of `side` is under attack
#[inline]
pub fn is_check(b: &Board, side: Color) -> bool {
    b.is_king_attacked(side)
}

/// Returns `true` if `side` is checkmated
///
/// Returns `false` right away when the king is not attacked. Stalemate is not detected, so a
/// side without legal moves which is not in check is simply not checkmated.
pub fn is_checkmate(b: &Board, side: Color) -> bool {
    if !is_check(b, side) {
        return false;
    }
    !has_legal_moves(b, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::PromotePiece;
    use rand::prelude::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn names(bb: Bitboard) -> Vec<String> {
        let mut res: Vec<_> = bb.into_iter().map(|s| s.to_string()).collect();
        res.sort();
        res
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(gen_all(&b, Color::White).len(), 20);
        assert_eq!(gen_all(&b, Color::Black).len(), 20);
        assert!(!is_check(&b, Color::White));
        assert!(!is_checkmate(&b, Color::White));
        assert_eq!(names(legal_moves(&b, sq("e2"), Color::White)), vec!["e3", "e4"]);
        assert!(legal_moves(&b, sq("e2"), Color::Black).is_empty());
        assert!(legal_moves(&b, sq("e4"), Color::White).is_empty());
    }

    #[test]
    fn test_pinned() {
        // The knight on e2 is pinned by the rook on e8
        let b = Board::from_placement("4r2k/8/8/8/8/8/4N3/4K3").unwrap();
        assert_eq!(movegen::pseudo_legal(&b, sq("e2")).len(), 6);
        assert!(legal_moves(&b, sq("e2"), Color::White).is_empty());
        assert_eq!(
            validate(&b, sq("e2"), sq("c3"), Color::White),
            Err(ValidateError::KingExposed {
                src: sq("e2"),
                dst: sq("c3")
            })
        );
        assert_eq!(
            validate(&b, sq("e2"), sq("e4"), Color::White),
            Err(ValidateError::IllegalDestination {
                src: sq("e2"),
                dst: sq("e4")
            })
        );
        assert_eq!(
            validate(&b, sq("e8"), sq("e7"), Color::White),
            Err(ValidateError::WrongTurn(sq("e8")))
        );
        assert_eq!(
            validate(&b, sq("a1"), sq("a2"), Color::White),
            Err(ValidateError::EmptySquare(sq("a1")))
        );

        // A pinned rook may still move along the pin line
        let b = Board::from_placement("4r2k/8/8/8/8/8/4R3/4K3").unwrap();
        assert_eq!(
            names(legal_moves(&b, sq("e2"), Color::White)),
            vec!["e3", "e4", "e5", "e6", "e7", "e8"]
        );
    }

    #[test]
    fn test_king_moves() {
        // The king can't step onto squares covered by the rook, and can't hide behind itself
        let b = Board::from_placement("7k/8/8/8/8/8/r7/4K3").unwrap();
        assert_eq!(names(legal_moves(&b, sq("e1"), Color::White)), vec!["d1", "f1"]);

        let b = Board::from_placement("7k/8/8/8/8/8/8/r3K3").unwrap();
        assert!(is_check(&b, Color::White));
        assert_eq!(
            names(legal_moves(&b, sq("e1"), Color::White)),
            vec!["d2", "e2", "f2"]
        );
    }

    #[test]
    fn test_king_not_capturable() {
        // Not reachable in a game: Black is in check while White is to move
        let b = Board::from_placement("4k3/8/8/8/8/8/8/4RK2").unwrap();
        assert!(movegen::pseudo_legal(&b, sq("e1")).has(sq("e8")));
        assert!(!legal_moves(&b, sq("e1"), Color::White).has(sq("e8")));
        assert_eq!(
            validate(&b, sq("e1"), sq("e8"), Color::White),
            Err(ValidateError::IllegalDestination {
                src: sq("e1"),
                dst: sq("e8")
            })
        );
    }

    #[test]
    fn test_validate_capture() {
        let b = Board::from_placement("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
        let mv = validate(&b, sq("e4"), sq("d5"), Color::White).unwrap();
        assert_eq!(mv.captured().map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(mv.make(&b).as_placement(), "4k3/8/8/3P4/8/8/8/4K3");
    }

    #[test]
    fn test_checkmate() {
        // Fool's mate
        let b = Board::from_placement("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR").unwrap();
        assert!(is_check(&b, Color::White));
        assert!(is_checkmate(&b, Color::White));
        assert!(gen_all(&b, Color::White).is_empty());
        assert!(!is_checkmate(&b, Color::Black));

        // Back rank mate
        let b = Board::from_placement("3R2k1/5ppp/8/8/8/8/8/6K1").unwrap();
        assert!(is_checkmate(&b, Color::Black));

        // Check, but the king can escape
        let b = Board::from_placement("3R2k1/5pp1/8/8/8/8/8/6K1").unwrap();
        assert!(is_check(&b, Color::Black));
        assert!(!is_checkmate(&b, Color::Black));

        // Check, but the checker can be captured
        let b = Board::from_placement("3R2k1/5ppp/8/8/8/8/8/3r2K1").unwrap();
        assert!(!is_checkmate(&b, Color::Black));

        // Stalemate is not a checkmate
        let b = Board::from_placement("7k/5Q2/6K1/8/8/8/8/8").unwrap();
        assert!(!is_check(&b, Color::Black));
        assert!(!has_legal_moves(&b, Color::Black));
        assert!(!is_checkmate(&b, Color::Black));
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let mut b = Board::initial();
            let mut side = Color::White;
            for _ in 0..100 {
                let moves = gen_all(&b, side);
                let mate = is_checkmate(&b, side);
                assert_eq!(mate, moves.is_empty() && is_check(&b, side));
                if moves.is_empty() {
                    break;
                }
                for mv in &moves {
                    // Legality filter soundness
                    assert!(!mv.make(&b).is_king_attacked(side), "{}", mv);
                }
                let mut mv = moves.choose(&mut rng).copied().unwrap();
                if mv.needs_promotion() {
                    mv = mv.with_promote(PromotePiece::Queen);
                }
                b = mv.make(&b);
                side = side.inv();
            }
        }
    }
}
