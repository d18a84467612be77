use std::fmt::{self, Display};
use std::hint;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("square at row {row}, col {col} is outside the board")]
pub struct OutOfBounds {
    pub row: usize,
    pub col: usize,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SquareParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PieceParseError {
    #[error("unexpected piece char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => File::A,
            1 => File::B,
            2 => File::C,
            3 => File::D,
            4 => File::E,
            5 => File::F,
            6 => File::G,
            7 => File::H,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(File::from_index((u32::from(c) - u32::from('a')) as usize)),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Rank of the board
///
/// Ranks are numbered in the order of rows: row 0 is the eighth rank, where Black
/// starts, and row 7 is the first rank.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R8 = 0,
    R7 = 1,
    R6 = 2,
    R5 = 3,
    R4 = 4,
    R3 = 5,
    R2 = 6,
    R1 = 7,
}

impl Rank {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Rank::R8,
            1 => Rank::R7,
            2 => Rank::R6,
            3 => Rank::R5,
            4 => Rank::R4,
            5 => Rank::R3,
            6 => Rank::R2,
            7 => Rank::R1,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(Rank::from_index((u32::from('8') - u32::from(c)) as usize)),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'8' - *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// A square is addressed by `(row, col)`, both in `0..8`. Row 0 is the eighth rank and
/// col 0 is the file `a`, so `(6, 4)` is `e2`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    pub const fn from_index(val: usize) -> Square {
        assert!(val < 64, "square must be between 0 and 63");
        Square(val as u8)
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Square {
        Square(val as u8)
    }

    pub const fn from_parts(file: File, rank: Rank) -> Square {
        Square(((rank as u8) << 3) | file as u8)
    }

    /// Creates a square from raw row and column, rejecting coordinates outside the grid
    pub const fn from_row_col(row: usize, col: usize) -> Result<Square, OutOfBounds> {
        if row >= 8 || col >= 8 {
            return Err(OutOfBounds { row, col });
        }
        Ok(Square(((row as u8) << 3) | col as u8))
    }

    pub const fn file(&self) -> File {
        unsafe { File::from_index_unchecked((self.0 & 7) as usize) }
    }

    pub const fn rank(&self) -> Rank {
        unsafe { Rank::from_index_unchecked((self.0 >> 3) as usize) }
    }

    pub const fn row(&self) -> usize {
        (self.0 >> 3) as usize
    }

    pub const fn col(&self) -> usize {
        (self.0 & 7) as usize
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the square shifted by `(delta_row, delta_col)`, or `None` if it leaves the board
    pub fn try_shift(self, delta_row: isize, delta_col: isize) -> Option<Square> {
        let row = self.row().wrapping_add(delta_row as usize);
        let col = self.col().wrapping_add(delta_col as usize);
        Square::from_row_col(row, col).ok()
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Square)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Square({})", self);
        }
        write!(f, "Square(?{:?})", self.0)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file().as_char(), self.rank().as_char())
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(SquareParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let (file_ch, rank_ch) = (bytes[0] as char, bytes[1] as char);
        Ok(Square::from_parts(
            File::from_char(file_ch).ok_or(SquareParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(SquareParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [PieceKind; PieceKind::COUNT] = [
        PieceKind::Pawn,
        PieceKind::King,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Upper-case letter of the piece, as used in FEN
    pub fn as_char(&self) -> char {
        b"PKNBRQ"[self.index()] as char
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        Some(match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'k' => PieceKind::King,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            _ => return None,
        })
    }
}

/// Chess piece, i.e. a pair of color and kind
///
/// Letter case is only used when a piece is converted to or from text. Inside the engine,
/// the color is always stored explicitly.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        [Color::White, Color::Black]
            .into_iter()
            .flat_map(|c| PieceKind::ALL.into_iter().map(move |k| Piece::new(c, k)))
    }

    pub fn as_char(&self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn as_utf8_char(&self) -> char {
        let table = match self.color {
            Color::White => ['♙', '♔', '♘', '♗', '♖', '♕'],
            Color::Black => ['♟', '♚', '♞', '♝', '♜', '♛'],
        };
        table[self.kind.index()]
    }

    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, PieceKind::from_char(c)?))
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Piece({:?} {:?})", self.color, self.kind)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Piece {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(PieceParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Piece::from_char(ch).ok_or(PieceParseError::UnexpectedChar(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file() {
        for (idx, file) in File::iter().enumerate() {
            assert_eq!(file.index(), idx);
            assert_eq!(File::from_index(idx), file);
        }
    }

    #[test]
    fn test_rank() {
        for (idx, rank) in Rank::iter().enumerate() {
            assert_eq!(rank.index(), idx);
            assert_eq!(Rank::from_index(idx), rank);
        }
    }

    #[test]
    fn test_square() {
        let mut squares = Vec::new();
        for rank in Rank::iter() {
            for file in File::iter() {
                let sq = Square::from_parts(file, rank);
                assert_eq!(sq.file(), file);
                assert_eq!(sq.rank(), rank);
                assert_eq!(Square::from_row_col(sq.row(), sq.col()), Ok(sq));
                squares.push(sq);
            }
        }
        assert_eq!(squares, Square::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_row_col() {
        let e2 = Square::from_row_col(6, 4).unwrap();
        assert_eq!(e2, Square::from_parts(File::E, Rank::R2));
        assert_eq!(e2.to_string(), "e2");
        assert_eq!(
            Square::from_row_col(8, 0),
            Err(OutOfBounds { row: 8, col: 0 })
        );
        assert_eq!(
            Square::from_row_col(0, 12),
            Err(OutOfBounds { row: 0, col: 12 })
        );
    }

    #[test]
    fn test_shift() {
        let a1 = Square::from_parts(File::A, Rank::R1);
        assert_eq!(a1.try_shift(1, 0), None);
        assert_eq!(a1.try_shift(0, -1), None);
        assert_eq!(
            a1.try_shift(-2, 1),
            Some(Square::from_parts(File::B, Rank::R3))
        );
        let h8 = Square::from_parts(File::H, Rank::R8);
        assert_eq!(h8.try_shift(-1, 0), None);
        assert_eq!(h8.try_shift(0, 1), None);
    }

    #[test]
    fn test_piece() {
        let pieces: Vec<_> = Piece::iter().collect();
        assert_eq!(pieces.len(), 12);
        for piece in pieces {
            assert_eq!(Piece::from_char(piece.as_char()), Some(piece));
            assert_eq!(Piece::from_str(&piece.to_string()), Ok(piece));
        }
        assert_eq!(
            Piece::from_char('N'),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(
            Piece::from_char('q'),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn test_square_str() {
        assert_eq!(
            Square::from_parts(File::B, Rank::R4).to_string(),
            "b4".to_string()
        );
        assert_eq!(
            Square::from_str("a1"),
            Ok(Square::from_parts(File::A, Rank::R1))
        );
        assert_eq!(
            Square::from_str("h8"),
            Ok(Square::from_row_col(0, 7).unwrap())
        );
        assert!(Square::from_str("h9").is_err());
        assert!(Square::from_str("i4").is_err());
        assert_eq!(Square::from_str("e"), Err(SquareParseError::BadLength));
    }
}
