// Simple command-line application to play chess on one terminal

use duelchess::{
    board::PrettyStyle, clock::format_time, Color, Game, MoveError, PieceKind, Square,
};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

fn parse_move(s: &str) -> Option<(Square, Square)> {
    let mut it = s.split_whitespace();
    let from = Square::from_str(it.next()?).ok()?;
    let to = Square::from_str(it.next()?).ok()?;
    if it.next().is_some() {
        return None;
    }
    Some((from, to))
}

fn main() {
    env_logger::init();
    let mut stdin = io::stdin().lock();

    let mut game = Game::new();

    loop {
        let state = game.current_state();
        if let Some(winner) = state.winner() {
            println!("{}", state.board().pretty(PrettyStyle::Ascii));
            println!("Checkmate, {} wins", winner);
            println!("History:");
            print!("{}", state.history());
            break;
        }

        println!("{}", state.board().pretty(PrettyStyle::Ascii));
        let clocks = state.clocks();
        println!(
            "White {}, Black {}",
            format_time(clocks.get(Color::White)),
            format_time(clocks.get(Color::Black))
        );
        let side = state.turn();
        let pending = state.promotion_pending();
        if let Some(sq) = pending {
            print!("{} promotes on {} (q/r/b/n): ", side, sq);
        } else {
            print!("{} move (e.g. \"e2 e4\"): ", side);
        }
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();

        // There is no real-time clock here, so each input takes one second from the mover.
        game.tick();

        let res = match (pending, parse_move(s)) {
            (Some(_), _) => match s.chars().next().and_then(PieceKind::from_char) {
                Some(kind) => game.choose_promotion(kind),
                None => Err(MoveError::BadPromotion(PieceKind::Pawn)),
            },
            (None, Some((from, to))) => game.apply_move(from, to),
            (None, None) => {
                println!("Bad input: {:?}", s);
                println!();
                continue;
            }
        };

        match res {
            Ok(outcome) if outcome.check => println!("Check!"),
            Ok(_) => {}
            Err(e) => println!("Bad move: {}", e),
        }
        println!();
    }
}
