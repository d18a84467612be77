//! Event loop of a single game
//!
//! Clicks, moves, promotion choices, remote moves and clock ticks all arrive as [`Event`]s and
//! are handled one at a time, so no two transitions of the game ever overlap.

use crate::game::{BaseGame, MoveOutcome, SelectionView};
use crate::transport::{MoveDescriptor, Transport};
use crate::types::{PieceKind, Square};

use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::{debug, trace};

/// Input to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Click on a square
    Select(Square),
    /// Local move
    Move { from: Square, to: Square },
    /// Local promotion choice
    Promote(PieceKind),
    /// Move received from the peer
    Remote(MoveDescriptor),
    /// One tick of the clock
    Tick,
    /// Stop the session
    Quit,
}

/// Owns the game and feeds it with events from a channel
pub struct Session<T: Transport> {
    game: BaseGame<T>,
    events: Receiver<Event>,
    interval: Duration,
}

impl<T: Transport> Session<T> {
    pub fn new(game: BaseGame<T>, events: Receiver<Event>) -> Self {
        let interval = game.config().tick_interval();
        Session {
            game,
            events,
            interval,
        }
    }

    #[inline]
    pub fn game(&self) -> &BaseGame<T> {
        &self.game
    }

    /// Processes a single event
    ///
    /// Returns [`ControlFlow::Break`] on [`Event::Quit`].
    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        trace!("handling {:?}", event);
        let res = match event {
            Event::Select(sq) => match self.game.select_square(sq) {
                SelectionView::Moved(outcome) => Ok(outcome),
                SelectionView::Rejected(e) => Err(e),
                _ => return ControlFlow::Continue(()),
            },
            Event::Move { from, to } => self.game.apply_move(from, to),
            Event::Promote(kind) => self.game.choose_promotion(kind),
            Event::Remote(desc) => self.game.receive_remote(&desc),
            Event::Tick => {
                self.game.tick();
                return ControlFlow::Continue(());
            }
            Event::Quit => return ControlFlow::Break(()),
        };
        match res {
            Ok(MoveOutcome {
                winner: Some(winner),
                ..
            }) => debug!("game over, {} wins", winner),
            Ok(_) => {}
            Err(e) => debug!("move rejected: {}", e),
        }
        ControlFlow::Continue(())
    }

    /// Processes events until [`Event::Quit`] arrives or all the senders are gone
    ///
    /// The clock ticks once per tick interval, no matter how many events arrive in between.
    /// Returns the game in the state it ended up in.
    pub fn run(mut self) -> BaseGame<T> {
        let mut next_tick = Instant::now() + self.interval;
        loop {
            let now = Instant::now();
            if now >= next_tick {
                next_tick += self.interval;
                self.handle(Event::Tick);
                continue;
            }
            let event = match self.events.recv_timeout(next_tick - now) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    next_tick += self.interval;
                    Event::Tick
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if self.handle(event).is_break() {
                break;
            }
        }
        self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Game;
    use crate::transport::NullTransport;
    use crate::types::Color;
    use std::str::FromStr;
    use std::sync::mpsc;
    use std::thread;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn slow_game() -> Game {
        let config = GameConfig {
            tick_interval_ms: 3_600_000,
            ..GameConfig::default()
        };
        Game::with_transport(&config, NullTransport)
    }

    #[test]
    fn test_handle() {
        let (_tx, rx) = mpsc::channel();
        let mut s = Session::new(Game::new(), rx);
        assert!(s.handle(Event::Select(sq("e2"))).is_continue());
        assert!(s.handle(Event::Select(sq("e4"))).is_continue());
        assert_eq!(s.game().current_state().turn(), Color::Black);

        assert!(s.handle(Event::Tick).is_continue());
        assert!(s.handle(Event::Tick).is_continue());
        let clocks = s.game().current_state().clocks();
        assert_eq!(clocks.get(Color::White), 300);
        assert_eq!(clocks.get(Color::Black), 298);

        // Rejected moves leave the game running
        assert!(s
            .handle(Event::Move {
                from: sq("e4"),
                to: sq("e5")
            })
            .is_continue());
        assert!(s
            .handle(Event::Remote(MoveDescriptor::from_squares(sq("e7"), sq("e5"))))
            .is_continue());
        assert_eq!(s.game().current_state().history().len(), 2);
        assert!(s.handle(Event::Quit).is_break());
    }

    #[test]
    fn test_run() {
        let (tx, rx) = mpsc::channel();
        let session = Session::new(slow_game(), rx);
        let handle = thread::spawn(move || session.run());

        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            tx.send(Event::Move {
                from: sq(from),
                to: sq(to),
            })
            .unwrap();
        }
        tx.send(Event::Quit).unwrap();

        let game = handle.join().unwrap();
        let state = game.current_state();
        assert_eq!(state.winner(), Some(Color::Black));
        assert_eq!(state.clocks().get(Color::White), 300);
    }

    #[test]
    fn test_disconnect() {
        let (tx, rx) = mpsc::channel();
        tx.send(Event::Promote(PieceKind::Queen)).unwrap();
        drop(tx);
        let game = Session::new(slow_game(), rx).run();
        assert!(game.current_state().history().is_empty());
    }

    #[test]
    fn test_ticks_under_load() {
        let config = GameConfig {
            tick_interval_ms: 1,
            ..GameConfig::default()
        };
        let (tx, rx) = mpsc::channel();
        // Selecting and deselecting keeps the queue busy for much longer than one tick
        // without changing the position
        for _ in 0..50_000 {
            tx.send(Event::Select(sq("e2"))).unwrap();
            tx.send(Event::Select(sq("a5"))).unwrap();
        }
        tx.send(Event::Quit).unwrap();

        let session = Session::new(Game::with_transport(&config, NullTransport), rx);
        let start = Instant::now();
        let game = session.run();
        assert!(start.elapsed() > Duration::from_millis(2));
        let state = game.current_state();
        assert!(state.history().is_empty());
        let clocks = state.clocks();
        assert!(clocks.get(Color::White) < 300);
        assert_eq!(clocks.get(Color::Black), 300);
    }

    #[test]
    fn test_ticks() {
        let config = GameConfig {
            tick_interval_ms: 1,
            ..GameConfig::default()
        };
        let (tx, rx) = mpsc::channel();
        let session = Session::new(Game::with_transport(&config, NullTransport), rx);
        let handle = thread::spawn(move || session.run());
        thread::sleep(Duration::from_millis(50));
        tx.send(Event::Quit).unwrap();

        let game = handle.join().unwrap();
        let clocks = game.current_state().clocks();
        assert!(clocks.get(Color::White) < 300);
        assert_eq!(clocks.get(Color::Black), 300);
    }
}
