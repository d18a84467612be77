//! Pseudo-legal move generation
//!
//! Functions in this module compute where a piece can go by its movement pattern and the
//! occupancy of the board only. They don't care whether the move leaves the mover's king
//! under attack; see [`legal`](crate::legal) for that.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::geometry;
use crate::types::{Color, OutOfBounds, PieceKind, Square};

fn is_enemy(b: &Board, sq: Square, c: Color) -> bool {
    matches!(b.get(sq), Some(p) if p.color != c)
}

fn pawn(b: &Board, src: Square, c: Color) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    let forward = geometry::pawn_forward_delta(c);

    if let Some(one) = src.try_shift(forward, 0) {
        if b.get(one).is_none() {
            res.set(one);
            if src.rank() == geometry::pawn_home_rank(c) {
                if let Some(two) = one.try_shift(forward, 0) {
                    if b.get(two).is_none() {
                        res.set(two);
                    }
                }
            }
        }
    }

    for delta_col in geometry::PAWN_CAPTURE_COLS {
        if let Some(dst) = src.try_shift(forward, delta_col) {
            if is_enemy(b, dst, c) {
                res.set(dst);
            }
        }
    }

    res
}

fn leaper(b: &Board, src: Square, c: Color, offsets: &[(isize, isize)]) -> Bitboard {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| src.try_shift(dr, dc))
        .filter(|&dst| !b.color(c).has(dst))
        .collect()
}

fn slider(b: &Board, src: Square, c: Color, dirs: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(dr, dc) in dirs {
        let mut cur = src;
        while let Some(next) = cur.try_shift(dr, dc) {
            match b.get(next) {
                None => res.set(next),
                Some(p) => {
                    if p.color != c {
                        res.set(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
    res
}

/// Returns all the pseudo-legal destinations of the piece standing on `src`
///
/// Returns an empty set if `src` is empty.
///
/// # Example
///
/// ```
/// # use duelchess::{Board, Square, movegen};
/// # use std::str::FromStr;
/// #
/// let b = Board::initial();
/// let dsts = movegen::pseudo_legal(&b, Square::from_str("g1").unwrap());
/// let mut names: Vec<_> = dsts.into_iter().map(|s| s.to_string()).collect();
/// names.sort();
/// assert_eq!(names, vec!["f3", "h3"]);
/// ```
pub fn pseudo_legal(b: &Board, src: Square) -> Bitboard {
    let piece = match b.get(src) {
        Some(piece) => piece,
        None => return Bitboard::EMPTY,
    };
    let c = piece.color;
    match piece.kind {
        PieceKind::Pawn => pawn(b, src, c),
        PieceKind::Knight => leaper(b, src, c, &geometry::KNIGHT_OFFSETS),
        PieceKind::King => leaper(b, src, c, &geometry::KING_OFFSETS),
        PieceKind::Bishop => slider(b, src, c, &geometry::BISHOP_DIRS),
        PieceKind::Rook => slider(b, src, c, &geometry::ROOK_DIRS),
        PieceKind::Queen => slider(b, src, c, &geometry::QUEEN_DIRS),
    }
}

/// Same as [`pseudo_legal()`], but takes raw coordinates and rejects the ones outside the board
pub fn pseudo_legal_at(b: &Board, row: usize, col: usize) -> Result<Bitboard, OutOfBounds> {
    Ok(pseudo_legal(b, Square::from_row_col(row, col)?))
}
