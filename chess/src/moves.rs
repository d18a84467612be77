//! Moves and their application to the board

use crate::board::Board;
use crate::geometry;
use crate::types::{Color, Piece, PieceKind, Square};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl From<PromotePiece> for PieceKind {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

impl TryFrom<PieceKind> for PromotePiece {
    type Error = PieceKind;

    #[inline]
    fn try_from(p: PieceKind) -> Result<Self, Self::Error> {
        match p {
            PieceKind::Knight => Ok(PromotePiece::Knight),
            PieceKind::Bishop => Ok(PromotePiece::Bishop),
            PieceKind::Rook => Ok(PromotePiece::Rook),
            PieceKind::Queen => Ok(PromotePiece::Queen),
            other => Err(other),
        }
    }
}

/// Error indicating that a move cannot be made
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// There is no piece on the source square
    #[error("no piece on {0}")]
    EmptySquare(Square),
    /// The piece on the source square belongs to the side which is not to move
    #[error("piece on {0} does not belong to the side to move")]
    WrongTurn(Square),
    /// The piece cannot reach the destination square at all
    #[error("{dst} is not a legal destination from {src}")]
    IllegalDestination { src: Square, dst: Square },
    /// The move is pseudo-legal, but leaves the mover's king under attack
    #[error("move from {src} to {dst} leaves the king exposed")]
    KingExposed { src: Square, dst: Square },
}

/// Chess move
///
/// A move is created by [`legal::validate()`](crate::legal::validate), so holding a `Move`
/// means it was legal on the board it was created for. Besides the squares, the move
/// remembers the moving piece and the piece it captured, if any.
///
/// `promote` stays `None` until the promotion choice is made.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    src: Square,
    dst: Square,
    piece: Piece,
    captured: Option<Piece>,
    promote: Option<PromotePiece>,
}

impl Move {
    pub(crate) fn new(src: Square, dst: Square, piece: Piece, captured: Option<Piece>) -> Move {
        Move {
            src,
            dst,
            piece,
            captured,
            promote: None,
        }
    }

    #[inline]
    pub fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Square {
        self.dst
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.piece.color
    }

    #[inline]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    #[inline]
    pub fn promote(&self) -> Option<PromotePiece> {
        self.promote
    }

    /// Returns the same move with the promotion choice filled in
    #[inline]
    pub fn with_promote(self, p: PromotePiece) -> Move {
        Move {
            promote: Some(p),
            ..self
        }
    }

    /// Returns `true` if this is a pawn move onto the far rank, which requires a promotion
    #[inline]
    pub fn needs_promotion(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
            && self.dst.rank() == geometry::promote_rank(self.piece.color)
    }

    /// Applies the move to a copy of `b`
    ///
    /// If the promotion choice is already filled in, the pawn is replaced as well.
    pub fn make(&self, b: &Board) -> Board {
        let mut res = b.clone();
        res.relocate(self.src, self.dst);
        if let Some(p) = self.promote {
            res.replace(self.dst, Piece::new(self.side(), p.into()));
        }
        res
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            let kind: PieceKind = p.into();
            write!(f, "{}", kind.as_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
