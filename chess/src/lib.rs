//! # duelchess
//!
//! Rules engine and turn controller for a two-player chess game.
//!
//! The crate is split into two layers. The rules layer ([`movegen`], [`attack`], [`legal`])
//! consists of pure functions over a validated [`Board`]: pseudo-legal move generation, attack
//! detection, legality filtering and checkmate detection. The controller layer ([`game`]) owns
//! the state of a single game and drives it through selection, moves, promotion, clock ticks
//! and game over.
//!
//! Castling, en passant and draws of any kind are not part of the rules.
//!
//! # Example
//!
//! ```
//! use duelchess::{Color, Game, Square};
//! use std::str::FromStr;
//!
//! let sq = |s| Square::from_str(s).unwrap();
//! let mut game = Game::new();
//! for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
//!     game.apply_move(sq(from), sq(to)).unwrap();
//! }
//! assert_eq!(game.current_state().winner(), Some(Color::Black));
//! assert_eq!(
//!     game.current_state().history().descriptions()[3],
//!     "q moved from d8 to h4",
//! );
//! ```

pub mod attack;
pub mod board;
pub mod clock;
pub mod config;
pub mod game;
pub mod history;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod session;
pub mod transport;

pub use duelchess_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use clock::Clocks;
pub use config::GameConfig;
pub use game::{BaseGame, Game, GameState, MoveError, MoveOutcome, SelectionView};
pub use history::{History, Record};
pub use moves::{Move, PromotePiece};
pub use types::{Color, File, OutOfBounds, Piece, PieceKind, Rank, Square};
