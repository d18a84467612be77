//! Relaying moves between two players
//!
//! The controller never talks to the network directly. It is given a [`Transport`] when the
//! game is created and hands it a [`MoveDescriptor`] after every successful local move. Moves
//! of the peer come back through [`BaseGame::receive_remote()`](crate::game::BaseGame::receive_remote)
//! and are validated exactly like local ones.

use crate::moves::PromotePiece;
use crate::types::{OutOfBounds, Square};

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error decoding [`MoveDescriptor`]
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The message is not a valid descriptor
    #[error("cannot decode move descriptor: {0}")]
    Json(#[from] serde_json::Error),
    /// The descriptor refers to a square outside the board
    #[error("bad square: {0}")]
    OutOfBounds(#[from] OutOfBounds),
}

/// Error sending [`MoveDescriptor`] to the peer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot encode move descriptor: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("peer disconnected")]
    Disconnected,
}

/// Square as it travels over the wire
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SquareRepr {
    pub row: usize,
    pub col: usize,
}

impl SquareRepr {
    #[inline]
    pub fn to_square(self) -> Result<Square, OutOfBounds> {
        Square::from_row_col(self.row, self.col)
    }
}

impl From<Square> for SquareRepr {
    #[inline]
    fn from(sq: Square) -> Self {
        SquareRepr {
            row: sq.row(),
            col: sq.col(),
        }
    }
}

/// Move as it travels over the wire
///
/// Carries enough to replay the move on the other side: both squares for a regular move, and
/// the chosen piece for a promotion.
///
/// # Example
///
/// ```
/// # use duelchess::transport::{MoveDescriptor, SquareRepr};
/// #
/// let d = MoveDescriptor::Move {
///     from: SquareRepr { row: 6, col: 4 },
///     to: SquareRepr { row: 4, col: 4 },
/// };
/// let json = d.to_json().unwrap();
/// assert_eq!(json, r#"{"type":"move","from":{"row":6,"col":4},"to":{"row":4,"col":4}}"#);
/// assert_eq!(MoveDescriptor::from_json(&json).unwrap(), d);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveDescriptor {
    Move { from: SquareRepr, to: SquareRepr },
    Promote { piece: PromotePiece },
}

impl MoveDescriptor {
    pub fn from_squares(from: Square, to: Square) -> MoveDescriptor {
        MoveDescriptor::Move {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Decodes the descriptor and checks that its squares are on the board
    pub fn from_json(s: &str) -> Result<MoveDescriptor, DescriptorError> {
        let res: MoveDescriptor = serde_json::from_str(s)?;
        if let MoveDescriptor::Move { from, to } = res {
            from.to_square()?;
            to.to_square()?;
        }
        Ok(res)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outgoing side of the connection to the peer
pub trait Transport {
    fn send(&mut self, desc: &MoveDescriptor) -> Result<(), TransportError>;
}

/// Transport that drops everything
///
/// Used for hot-seat games, where both players share the same controller.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct NullTransport;

impl Transport for NullTransport {
    #[inline]
    fn send(&mut self, _desc: &MoveDescriptor) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Transport that sends JSON-encoded descriptors into a channel
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Sender<String>,
}

impl ChannelTransport {
    pub fn new(tx: Sender<String>) -> ChannelTransport {
        ChannelTransport { tx }
    }

    /// Creates the transport together with the receiving end of its channel
    pub fn pair() -> (ChannelTransport, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (ChannelTransport::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, desc: &MoveDescriptor) -> Result<(), TransportError> {
        let msg = desc.to_json()?;
        self.tx.send(msg).map_err(|_| TransportError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decode() {
        let d = MoveDescriptor::from_json(r#"{"type":"promote","piece":"queen"}"#).unwrap();
        assert_eq!(
            d,
            MoveDescriptor::Promote {
                piece: PromotePiece::Queen
            }
        );

        let d = MoveDescriptor::from_json(
            r#"{"type":"move","from":{"row":1,"col":0},"to":{"row":3,"col":0}}"#,
        )
        .unwrap();
        assert_eq!(
            d,
            MoveDescriptor::from_squares(
                Square::from_str("a7").unwrap(),
                Square::from_str("a5").unwrap()
            )
        );

        assert!(matches!(
            MoveDescriptor::from_json(r#"{"type":"promote","piece":"king"}"#),
            Err(DescriptorError::Json(_))
        ));
        assert!(matches!(
            MoveDescriptor::from_json(r#"{"type":"move","from":{"row":8,"col":0},"to":{"row":3,"col":0}}"#),
            Err(DescriptorError::OutOfBounds(OutOfBounds { row: 8, col: 0 }))
        ));
        // Piece identity alone is not enough to replay a move
        assert!(matches!(
            MoveDescriptor::from_json(r#""P""#),
            Err(DescriptorError::Json(_))
        ));
    }

    #[test]
    fn test_channel() {
        let (mut t, rx) = ChannelTransport::pair();
        let d = MoveDescriptor::Promote {
            piece: PromotePiece::Knight,
        };
        t.send(&d).unwrap();
        assert_eq!(rx.recv().unwrap(), r#"{"type":"promote","piece":"knight"}"#);

        drop(rx);
        assert!(matches!(t.send(&d), Err(TransportError::Disconnected)));
        assert!(NullTransport.send(&d).is_ok());
    }
}
