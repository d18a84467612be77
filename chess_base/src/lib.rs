//! # Base types for duelchess
//!
//! This is an auxiliary crate for `duelchess`, which contains the plain data types: squares,
//! colors, pieces, square sets and board geometry. It holds no chess rules.
//!
//! Normally you don't want to use this crate directly. Use `duelchess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
