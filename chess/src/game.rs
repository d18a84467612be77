//! Game controller
//!
//! [`BaseGame`] owns the whole state of a single game and is the only thing that changes it.
//! Every transition works on a copy of [`GameState`] and replaces the committed state only once
//! the transition succeeded, so a failed call leaves the game exactly as it was.

use crate::bitboard::Bitboard;
use crate::board::{Board, ValidateError};
use crate::clock::{ClockView, Clocks};
use crate::config::GameConfig;
use crate::history::{History, Record};
use crate::legal;
use crate::moves::{self, Move, PromotePiece};
use crate::transport::{MoveDescriptor, NullTransport, Transport};
use crate::types::{Color, OutOfBounds, Piece, PieceKind, Square};

use log::{debug, info, trace, warn};
use thiserror::Error;

/// Error applying a move or a promotion choice
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("piece on {0} does not belong to the side to move")]
    WrongTurn(Square),
    #[error("{dst} is not a legal destination from {src}")]
    IllegalDestination { src: Square, dst: Square },
    #[error("move from {src} to {dst} leaves the king exposed")]
    KingExposed { src: Square, dst: Square },
    #[error("bad square: {0}")]
    OutOfBounds(#[from] OutOfBounds),
    /// A pawn on the given square waits for the promotion choice
    #[error("pawn on {0} must be promoted first")]
    PromotionPending(Square),
    #[error("no promotion is pending")]
    NoPromotionPending,
    #[error("cannot promote to {0:?}")]
    BadPromotion(PieceKind),
    #[error("game is over")]
    GameOver,
}

impl From<moves::ValidateError> for MoveError {
    fn from(e: moves::ValidateError) -> Self {
        match e {
            moves::ValidateError::EmptySquare(sq) => MoveError::EmptySquare(sq),
            moves::ValidateError::WrongTurn(sq) => MoveError::WrongTurn(sq),
            moves::ValidateError::IllegalDestination { src, dst } => {
                MoveError::IllegalDestination { src, dst }
            }
            moves::ValidateError::KingExposed { src, dst } => MoveError::KingExposed { src, dst },
        }
    }
}

/// Phase of the game
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The side to move may select squares and make moves
    Playing,
    /// The given pawn move reached the far rank and waits for the promotion choice
    PromotionPending(Move),
    /// The game ended with a checkmate
    GameOver { winner: Color },
}

/// Currently selected square together with its legal destinations
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Selection {
    pub square: Square,
    pub destinations: Bitboard,
}

/// Committed state of a game
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    turn: Color,
    history: History,
    selection: Option<Selection>,
    phase: Phase,
    clocks: Clocks,
}

/// Read-only snapshot of the game, as given to the rendering layer
pub type GameStateView = GameState;

impl GameState {
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn clocks(&self) -> ClockView {
        self.clocks
    }

    /// Returns the square of the pawn waiting for promotion, if any
    pub fn promotion_pending(&self) -> Option<Square> {
        match self.phase {
            Phase::PromotionPending(mv) => Some(mv.dst()),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        legal::is_check(&self.board, self.turn)
    }

    // Passes the turn to the opponent and checks whether the opponent got checkmated.
    fn finish_turn(&mut self) {
        let mover = self.turn;
        self.turn = mover.inv();
        self.phase = Phase::Playing;
        if legal::is_checkmate(&self.board, self.turn) {
            info!("{} is checkmated, {} wins", self.turn, mover);
            self.phase = Phase::GameOver { winner: mover };
        }
    }
}

/// Result of a successful move or promotion choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move, with the promotion filled in if it was just chosen
    pub mv: Move,
    /// Board after the move
    pub board: Board,
    /// `true` if the move waits for the promotion choice
    pub promotion_pending: bool,
    /// `true` if the side to move is now in check
    pub check: bool,
    /// Set if the move ended the game
    pub winner: Option<Color>,
}

impl MoveOutcome {
    fn new(mv: Move, state: &GameState) -> MoveOutcome {
        let promotion_pending = state.promotion_pending().is_some();
        MoveOutcome {
            mv,
            board: state.board.clone(),
            promotion_pending,
            check: !promotion_pending && state.is_check(),
            winner: state.winner(),
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }
}

/// What happened after a click on a square
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionView {
    /// Nothing is selected
    Empty,
    /// A piece is selected and may go to any of `destinations`
    Selected {
        square: Square,
        destinations: Bitboard,
    },
    /// The click completed a move
    Moved(MoveOutcome),
    /// The click tried a move that is not allowed, and the selection was cleared
    Rejected(MoveError),
}

/// Hot-seat game, where both players use the same controller
pub type Game = BaseGame<NullTransport>;

/// Game controller, generic over the way moves are relayed to the peer
#[derive(Debug, Clone)]
pub struct BaseGame<T: Transport> {
    state: GameState,
    config: GameConfig,
    transport: T,
}

impl Game {
    /// Starts a hot-seat game from the initial position with default settings
    pub fn new() -> Game {
        Game::with_transport(&GameConfig::default(), NullTransport)
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl<T: Transport> BaseGame<T> {
    /// Starts a game from the initial position
    pub fn with_transport(config: &GameConfig, transport: T) -> Self {
        BaseGame {
            state: GameState {
                board: Board::initial(),
                turn: Color::White,
                history: History::new(),
                selection: None,
                phase: Phase::Playing,
                clocks: Clocks::new(config.initial_clock),
            },
            config: config.clone(),
            transport,
        }
    }

    /// Starts a game from an arbitrary position with `turn` to move
    ///
    /// Fails if the side which is not to move is in check. If `turn` is already checkmated, the
    /// game is over from the start.
    pub fn from_board(
        board: Board,
        turn: Color,
        config: &GameConfig,
        transport: T,
    ) -> Result<Self, ValidateError> {
        if board.is_king_attacked(turn.inv()) {
            return Err(ValidateError::OpponentKingAttacked(turn.inv()));
        }
        let phase = if legal::is_checkmate(&board, turn) {
            Phase::GameOver { winner: turn.inv() }
        } else {
            Phase::Playing
        };
        Ok(BaseGame {
            state: GameState {
                board,
                turn,
                history: History::new(),
                selection: None,
                phase,
                clocks: Clocks::new(config.initial_clock),
            },
            config: config.clone(),
            transport,
        })
    }

    #[inline]
    pub fn current_state(&self) -> &GameStateView {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Handles a click on `sq`
    ///
    /// Selects a piece of the side to move if it has any legal moves, and performs the move if
    /// `sq` is one of the destinations of the selected piece. Clicking anything else clears the
    /// selection. A click that tries to leave the king exposed is reported as
    /// [`SelectionView::Rejected`].
    pub fn select_square(&mut self, sq: Square) -> SelectionView {
        if self.state.phase != Phase::Playing {
            return SelectionView::Empty;
        }

        if let Some(sel) = self.state.selection {
            if sel.destinations.has(sq) {
                return match self.apply_move(sel.square, sq) {
                    Ok(outcome) => SelectionView::Moved(outcome),
                    Err(e) => {
                        self.state.selection = None;
                        SelectionView::Rejected(e)
                    }
                };
            }
        }

        let turn = self.state.turn;
        let own = matches!(self.state.board.get(sq), Some(p) if p.color == turn);
        if !own {
            let prev = self.state.selection.take();
            if let Some(sel) = prev {
                if let Err(e @ moves::ValidateError::KingExposed { .. }) =
                    legal::validate(&self.state.board, sel.square, sq, turn)
                {
                    trace!("rejected {}{}: {}", sel.square, sq, e);
                    return SelectionView::Rejected(e.into());
                }
            }
            trace!("selection cleared");
            return SelectionView::Empty;
        }

        let destinations = legal::legal_moves(&self.state.board, sq, turn);
        if destinations.is_empty() {
            trace!("{} has no legal moves", sq);
            self.state.selection = None;
            return SelectionView::Empty;
        }
        trace!("selected {}", sq);
        self.state.selection = Some(Selection {
            square: sq,
            destinations,
        });
        SelectionView::Selected {
            square: sq,
            destinations,
        }
    }

    /// Same as [`select_square()`](Self::select_square), but takes raw coordinates
    pub fn select_at(&mut self, row: usize, col: usize) -> Result<SelectionView, OutOfBounds> {
        Ok(self.select_square(Square::from_row_col(row, col)?))
    }

    /// Moves the piece from `from` to `to` on behalf of the side to move
    ///
    /// On success the move is sent to the peer.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        let outcome = self.commit_move(from, to)?;
        self.emit(&MoveDescriptor::from_squares(from, to));
        Ok(outcome)
    }

    /// Replaces the pawn waiting for promotion with a piece of kind `kind`
    ///
    /// On success the choice is sent to the peer.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<MoveOutcome, MoveError> {
        let piece = PromotePiece::try_from(kind).map_err(MoveError::BadPromotion)?;
        let outcome = self.commit_promotion(piece)?;
        self.emit(&MoveDescriptor::Promote { piece });
        Ok(outcome)
    }

    /// Applies the move received from the peer
    ///
    /// The move goes through the same validation as a local one, and is not sent back.
    pub fn receive_remote(&mut self, desc: &MoveDescriptor) -> Result<MoveOutcome, MoveError> {
        let res = match *desc {
            MoveDescriptor::Move { from, to } => {
                let from = from.to_square()?;
                let to = to.to_square()?;
                self.commit_move(from, to)
            }
            MoveDescriptor::Promote { piece } => self.commit_promotion(piece),
        };
        if let Err(e) = &res {
            warn!("rejected remote move {:?}: {}", desc, e);
        }
        res
    }

    /// Takes one second from the clock of the side to move
    ///
    /// The clocks stop once the game is over.
    pub fn tick(&mut self) -> ClockView {
        if self.state.is_game_over() {
            return self.state.clocks;
        }
        let turn = self.state.turn;
        let mut clocks = self.state.clocks;
        let was_expired = clocks.is_expired(turn);
        clocks.tick(turn);
        if !was_expired && clocks.is_expired(turn) {
            debug!("clock of {} reached zero", turn);
        }
        self.state.clocks = clocks;
        clocks
    }

    fn commit_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        match self.state.phase {
            Phase::Playing => {}
            Phase::PromotionPending(mv) => return Err(MoveError::PromotionPending(mv.dst())),
            Phase::GameOver { .. } => return Err(MoveError::GameOver),
        }

        let mv = legal::validate(&self.state.board, from, to, self.state.turn)?;
        let mut next = self.state.clone();
        next.board = mv.make(&self.state.board);
        next.history.push(Record::Move(mv));
        next.selection = None;
        if mv.needs_promotion() {
            debug!("{} moved {}, waiting for promotion", mv.side(), mv);
            next.phase = Phase::PromotionPending(mv);
        } else {
            debug!("{} moved {}", mv.side(), mv);
            next.finish_turn();
        }

        self.state = next;
        Ok(MoveOutcome::new(mv, &self.state))
    }

    fn commit_promotion(&mut self, piece: PromotePiece) -> Result<MoveOutcome, MoveError> {
        let mv = match self.state.phase {
            Phase::PromotionPending(mv) => mv.with_promote(piece),
            Phase::Playing => return Err(MoveError::NoPromotionPending),
            Phase::GameOver { .. } => return Err(MoveError::GameOver),
        };

        let promoted = Piece::new(mv.side(), piece.into());
        let mut next = self.state.clone();
        next.board.replace(mv.dst(), promoted);
        next.history.push(Record::Promotion {
            square: mv.dst(),
            pawn: mv.piece(),
            piece: promoted,
        });
        debug!("{} promoted to {:?} on {}", mv.side(), piece, mv.dst());
        next.finish_turn();

        self.state = next;
        Ok(MoveOutcome::new(mv, &self.state))
    }

    fn emit(&mut self, desc: &MoveDescriptor) {
        if let Err(e) = self.transport.send(desc) {
            warn!("cannot send {:?} to the peer: {}", desc, e);
        }
    }
}
