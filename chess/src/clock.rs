//! Countdown clocks of both players

use crate::types::Color;

use std::fmt;

/// Time in seconds
pub type Seconds = u32;

/// Remaining time of both sides
///
/// Each tick takes one second from exactly one side. The time never goes below zero, and
/// reaching zero has no effect on the game by itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Clocks {
    white: Seconds,
    black: Seconds,
}

/// Read-only view of the clocks, as reported to the rendering layer
pub type ClockView = Clocks;

impl Clocks {
    pub const fn new(initial: Seconds) -> Clocks {
        Clocks {
            white: initial,
            black: initial,
        }
    }

    #[inline]
    pub fn get(&self, c: Color) -> Seconds {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    pub fn is_expired(&self, c: Color) -> bool {
        self.get(c) == 0
    }

    /// Takes one second from the clock of `c`
    ///
    /// Returns the remaining time of `c`.
    pub fn tick(&mut self, c: Color) -> Seconds {
        let t = match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        *t = t.saturating_sub(1);
        *t
    }
}

/// Formats `secs` as `m:ss`
///
/// ```
/// # use duelchess::clock::format_time;
/// assert_eq!(format_time(300), "5:00");
/// assert_eq!(format_time(69), "1:09");
/// assert_eq!(format_time(0), "0:00");
/// ```
pub fn format_time(secs: Seconds) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl fmt::Display for Clocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "White: {}, Black: {}",
            format_time(self.white),
            format_time(self.black)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick() {
        let mut c = Clocks::new(3);
        assert_eq!(c.tick(Color::White), 2);
        assert_eq!(c.get(Color::White), 2);
        assert_eq!(c.get(Color::Black), 3);
        assert_eq!(c.tick(Color::Black), 2);
        assert_eq!(c.tick(Color::White), 1);
        assert_eq!(c.tick(Color::White), 0);
        assert!(c.is_expired(Color::White));
        assert_eq!(c.tick(Color::White), 0);
        assert_eq!(c.get(Color::White), 0);
        assert_eq!(c.get(Color::Black), 2);
        assert!(!c.is_expired(Color::Black));
        assert_eq!(c.to_string(), "White: 0:00, Black: 0:02");
    }
}
