// Simple command-line application to play orthodox chess

use chessrules::{board::PrettyStyle, standard, Color};
use std::io::{self, BufRead, Write};

fn main() {
    let mut stdin = io::stdin().lock();

    let mut game = standard::game();

    loop {
        if let Some(outcome) = game.outcome() {
            println!("Game finished: {}", outcome);
            println!("Moves: {}", game.move_list());
            break;
        }

        println!("{}", game.worker().board().pretty(PrettyStyle::Ascii));
        let side = match game.side() {
            Color::White => "White",
            Color::Black => "Black",
        };
        print!("{} move ({} legal, \"undo\" to take back): ", side, game.legal_moves().len());
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();

        if s == "undo" {
            if game.pop().is_none() {
                println!("Nothing to undo");
            }
            println!();
            continue;
        }

        // Moves are given as source and destination squares, like `e2e4`. Special moves such as
        // castling are made the same way, by moving the king.
        if let Err(e) = game.push_str(s) {
            println!("Bad move: {}", e);
        }
        println!();
    }
}
