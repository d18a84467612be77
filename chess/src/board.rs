//! Board and related things

use crate::attack;
use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{Color, File, Piece, PieceKind, Rank, Square};

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    MissingKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// The king of the side which is not to move is under attack
    #[error("king of color {0:?} is attacked while it is not its turn")]
    OpponentKingAttacked(Color),
}

/// Error parsing the piece placement (i.e. the first part of FEN)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlacementParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`Board`] from piece placement
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BoardParseError {
    /// Placement cannot be parsed
    #[error("cannot parse placement: {0}")]
    Placement(#[from] PlacementParseError),
    /// Placement was parsed, but the board is invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Raw chess board
///
/// Raw board is a plain grid of 64 squares, each holding at most one piece. Unlike [`Board`],
/// it is not validated and may contain any arrangement of pieces.
///
/// Raw board can be used to build a position programmatically. After placing the pieces, it
/// must be converted to [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use duelchess::{RawBoard, Board, File, Rank, Color, Piece, PieceKind};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put2(File::B, Rank::R2, Some(Piece::new(Color::White, PieceKind::King)));
/// raw.put2(File::D, Rank::R5, Some(Piece::new(Color::Black, PieceKind::King)));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.as_placement(), "8/8/8/3k4/8/8/1K6/8");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the board
    ///
    /// The indices in this array are the indices of squares. You might probably want to use
    /// the functions like [`RawBoard::get()`] or [`RawBoard::put()`] instead of indexing this array
    /// directly.
    pub cells: [Option<Piece>; 64],
}

impl RawBoard {
    /// Returns an empty `RawBoard`
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard { cells: [None; 64] }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
        let mut res = RawBoard::empty();
        for color in [Color::White, Color::Black] {
            let back = [
                PieceKind::Rook,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Queen,
                PieceKind::King,
                PieceKind::Bishop,
                PieceKind::Knight,
                PieceKind::Rook,
            ];
            for (file, kind) in File::iter().zip(back) {
                res.put2(file, geometry::back_rank(color), Some(Piece::new(color, kind)));
                res.put2(
                    file,
                    geometry::pawn_home_rank(color),
                    Some(Piece::new(color, PieceKind::Pawn)),
                );
            }
        }
        res
    }

    /// Parses a raw board from piece placement
    pub fn from_placement(s: &str) -> Result<RawBoard, PlacementParseError> {
        RawBoard::from_str(s)
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Square::from_parts(file, rank))
    }

    /// Puts `piece` to the square `sq`
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.index()] = piece;
    }

    /// Puts `piece` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, piece: Option<Piece>) {
        self.put(Square::from_parts(file, rank), piece);
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use duelchess::{RawBoard, board::PrettyStyle};
    /// #
    /// let r = RawBoard::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    ///  |abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }

    /// Converts the board into a piece placement string
    #[inline]
    pub fn as_placement(&self) -> String {
        self.to_string()
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Board that contains a valid arrangement of pieces
///
/// The board always has exactly one king of each color and no more than 16 pieces of each
/// color. This is what makes attack and checkmate detection well-defined, so every rules
/// function in this crate takes a `Board`, not a [`RawBoard`].
///
/// Alongside the [`RawBoard`], it keeps the squares occupied by each color and the position of
/// each king.
#[derive(Debug, Clone)]
pub struct Board {
    r: RawBoard,
    white: Bitboard,
    black: Bitboard,
    kings: [Square; 2],
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board::from_raw_unchecked(RawBoard::initial())
    }

    /// Parses a board from piece placement
    ///
    /// # Example
    ///
    /// ```
    /// # use duelchess::{Board, board::{BoardParseError, ValidateError}, Color};
    /// #
    /// assert!(Board::from_placement("4k3/8/8/8/8/8/8/4K3").is_ok());
    /// assert_eq!(
    ///     Board::from_placement("8/8/8/8/8/8/8/4K3").unwrap_err(),
    ///     BoardParseError::Valid(ValidateError::MissingKing(Color::Black)),
    /// );
    /// ```
    pub fn from_placement(s: &str) -> Result<Board, BoardParseError> {
        Board::from_str(s)
    }

    // Must only be called on boards known to be valid.
    fn from_raw_unchecked(raw: RawBoard) -> Board {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut kings = [Square::from_index(0); 2];
        for sq in Square::iter() {
            if let Some(piece) = raw.get(sq) {
                match piece.color {
                    Color::White => white.set(sq),
                    Color::Black => black.set(sq),
                }
                if piece.kind == PieceKind::King {
                    kings[piece.color.index()] = sq;
                }
            }
        }
        Board {
            r: raw,
            white,
            black,
            kings,
        }
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.r.get(sq)
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.r.get2(file, rank)
    }

    /// Returns the set of squares occupied by the pieces of color `c`
    #[inline]
    pub fn color(&self, c: Color) -> Bitboard {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn color_mut(&mut self, c: Color) -> &mut Bitboard {
        match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Returns the set of all occupied squares
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.white | self.black
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Square {
        self.kings[c.index()]
    }

    /// Iterates over all the pieces of color `c` together with their squares
    pub fn pieces(&self, c: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.color(c)
            .into_iter()
            .filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Moves the piece from `src` to `dst`, overwriting whatever stands on `dst`
    ///
    /// Returns the overwritten piece. Does nothing if `src` is empty. The caller must make sure
    /// that `dst` doesn't hold a king.
    pub(crate) fn relocate(&mut self, src: Square, dst: Square) -> Option<Piece> {
        let piece = self.r.get(src)?;
        let captured = self.r.get(dst);
        if let Some(victim) = captured {
            self.color_mut(victim.color).unset(dst);
        }
        self.r.put(src, None);
        self.r.put(dst, Some(piece));
        let own = self.color_mut(piece.color);
        own.unset(src);
        own.set(dst);
        if piece.kind == PieceKind::King {
            self.kings[piece.color.index()] = dst;
        }
        captured
    }

    /// Replaces the piece on `sq` with `piece` of the same color, keeping the king positions intact
    pub(crate) fn replace(&mut self, sq: Square, piece: Piece) {
        debug_assert_ne!(piece.kind, PieceKind::King);
        debug_assert_eq!(self.r.get(sq).map(|p| p.color), Some(piece.color));
        self.r.put(sq, Some(piece));
    }

    /// Returns `true` if the king of color `c` is under attack
    #[inline]
    pub fn is_king_attacked(&self, c: Color) -> bool {
        attack::is_attacked(self, self.king_pos(c), c.inv())
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// See docs for [`RawBoard::pretty()`] for more usage details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }

    /// Converts the board into a piece placement string
    #[inline]
    pub fn as_placement(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Board {
    #[inline]
    fn eq(&self, other: &Board) -> bool {
        self.r == other.r
    }
}

impl Eq for Board {}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: RawBoard) -> Result<Board, ValidateError> {
        for color in [Color::White, Color::Black] {
            let mut pieces = 0;
            let mut kings = 0;
            for piece in raw.cells.iter().flatten() {
                if piece.color != color {
                    continue;
                }
                pieces += 1;
                if piece.kind == PieceKind::King {
                    kings += 1;
                }
            }
            if pieces > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            if kings == 0 {
                return Err(ValidateError::MissingKing(color));
            }
            if kings > 1 {
                return Err(ValidateError::TooManyKings(color));
            }
        }
        Ok(Board::from_raw_unchecked(raw))
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawBoard,
    style: PrettyStyle,
}

fn parse_cells(s: &str) -> Result<[Option<Piece>; 64], PlacementParseError> {
    type Error = PlacementParseError;

    let mut file = 0_usize;
    let mut rank = 0_usize;
    let mut pos = 0_usize;
    let mut cells = [None; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                file += add;
                pos += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(Rank::from_index(rank)));
                }
                rank += 1;
                file = 0;
                if rank >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                let piece = Piece::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
                cells[pos] = Some(piece);
                file += 1;
                pos += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(Rank::from_index(rank)));
    }
    if rank < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

impl FromStr for RawBoard {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        Ok(RawBoard {
            cells: parse_cells(s.trim())?,
        })
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(RawBoard::from_str(s)?.try_into()?)
    }
}

impl Display for RawBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            if rank.index() != 0 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let piece = match self.get2(file, rank) {
                    Some(piece) => piece,
                    None => {
                        empty += 1;
                        continue;
                    }
                };
                if empty != 0 {
                    write!(f, "{}", (b'0' + empty) as char)?;
                    empty = 0;
                }
                write!(f, "{}", piece)?;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
            }
        }
        Ok(())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.r.fmt(f)
    }
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const EMPTY: char;

    fn piece(p: Piece) -> char;

    fn fmt(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                let c = r.get2(file, rank).map_or(Self::EMPTY, Self::piece);
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, " {}", Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const EMPTY: char = '.';

    fn piece(p: Piece) -> char {
        p.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const EMPTY: char = '.';

    fn piece(p: Piece) -> char {
        p.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}
