//! Append-only log of what happened in a game

use crate::moves::Move;
use crate::types::{Piece, Square};

use std::fmt;
use std::slice;

/// Entry of the move history
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Record {
    /// A piece moved, possibly capturing
    Move(Move),
    /// A pawn that reached the far rank was replaced with `piece`
    Promotion {
        square: Square,
        pawn: Piece,
        piece: Piece,
    },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Record::Move(mv) => write!(
                f,
                "{} moved from {} to {}",
                mv.piece(),
                mv.src(),
                mv.dst()
            ),
            Record::Promotion {
                square,
                pawn,
                piece,
            } => write!(f, "{} promoted to {} on {}", pawn, piece, square),
        }
    }
}

/// Move history of a game
///
/// Records are only ever appended, and only by the game controller.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct History(Vec<Record>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, r: Record) {
        self.0.push(r);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Record> {
        self.0.last()
    }

    /// Iterates over the moves only, skipping promotion records
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.0.iter().filter_map(|r| match r {
            Record::Move(mv) => Some(*mv),
            Record::Promotion { .. } => None,
        })
    }

    /// Returns the human-readable descriptions of all the records
    pub fn descriptions(&self) -> Vec<String> {
        self.0.iter().map(|r| r.to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for r in &self.0 {
            writeln!(f, "{}", r)?;
        }
        Ok(())
    }
}
