//! Orthodox chess, expressed with the rule engine

use crate::board::Board;
use crate::event::Event;
use crate::game::Game;
use crate::moves::Action;
use crate::parser;
use crate::position::Position;
use crate::predicate::Predicate;
use crate::registry::PieceRegistry;
use crate::ruleset::RuleSet;
use crate::template::{CastlingOptions, MoveTemplate};
use crate::types::MoveState;
use crate::worker::MoveWorker;

use chessrules_base::{Color, Coord, Owner, Pattern, Piece, PieceId, DIAGONAL, KNIGHT_JUMPS, ORTHOGONAL};

use std::sync::Arc;

const BACK_RANK: &str = "RNBQKBNR";

fn id(c: char, side: Color) -> PieceId {
    match side {
        Color::White => PieceId::new(c.to_ascii_uppercase()),
        Color::Black => PieceId::new(c.to_ascii_lowercase()),
    }
}

fn slides(dirs: &[(i8, i8)]) -> Vec<Pattern> {
    dirs.iter().map(|&(dx, dy)| Pattern::slide(dx, dy)).collect()
}

fn steps(dirs: &[(i8, i8)]) -> Vec<Pattern> {
    dirs.iter().map(|&(dx, dy)| Pattern::step(dx, dy)).collect()
}

fn pieces(side: Color) -> Vec<Piece> {
    let owner = Owner::from(side);
    let f = side.forward();
    let all_dirs: Vec<_> = ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect();
    vec![
        Piece::builder(id('p', side), owner)
            .movement(Pattern::step(0, f))
            .captures([Pattern::step(-1, f), Pattern::step(1, f)])
            .build(),
        Piece::builder(id('n', side), owner)
            .movements(KNIGHT_JUMPS.iter().map(|&(dx, dy)| Pattern::Jump { dx, dy }))
            .build(),
        Piece::builder(id('b', side), owner)
            .movements(slides(&DIAGONAL))
            .build(),
        Piece::builder(id('r', side), owner)
            .movements(slides(&ORTHOGONAL))
            .build(),
        Piece::builder(id('q', side), owner)
            .movements(slides(&all_dirs))
            .build(),
        Piece::builder(id('k', side), owner)
            .movements(steps(&all_dirs))
            .royal(true)
            .build(),
    ]
}

/// Pieces of both sides: `P N B R Q K` for white and `p n b r q k` for black
pub fn registry() -> PieceRegistry {
    pieces(Color::White)
        .into_iter()
        .chain(pieces(Color::Black))
        .collect()
}

/// Initial position
pub fn board() -> Board {
    let mut b = Board::empty(8, 8);
    for (file, c) in BACK_RANK.chars().enumerate() {
        b.put(Coord::from_parts(file, 0), Some(id(c, Color::White)));
        b.put(Coord::from_parts(file, 1), Some(id('p', Color::White)));
        b.put(Coord::from_parts(file, 6), Some(id('p', Color::Black)));
        b.put(Coord::from_parts(file, 7), Some(id(c, Color::Black)));
    }
    b
}

/// Initial position with the standard pieces
pub fn worker() -> MoveWorker {
    MoveWorker::new(board(), Arc::new(registry()))
}

fn compile(script: &str) -> Predicate {
    // The scripts are fixed, so failure here is a bug in this module
    parser::parse_code(script).expect("built-in rule script must compile")
}

fn royal(side: Color) -> &'static str {
    match side {
        Color::White => "ROYAL_WHITE",
        Color::Black => "ROYAL_BLACK",
    }
}

/// Rules for the moves of `side`
///
/// A move may not leave the own king attacked. Pawns reaching the last rank become queens, and
/// checkmate wins. A side left without legal moves after the opponent's move ends the game in
/// a tie.
pub fn rules(side: Color) -> RuleSet {
    let opp = side.inv();
    let last_rank = match side {
        Color::White => 8,
        Color::Black => 1,
    };
    let legality = compile(&format!(
        "return = !attacked(next_state, {})",
        royal(side)
    ));
    let checkmate = compile(&format!(
        "check = attacked(next_state, {royal})\n\
         return = check && for_every(check, {opp})",
        royal = royal(opp),
        opp = opp,
    ));
    let promotion = compile(&format!(
        "pawn = piece_moved({pawn}, this_move)\n\
         last = has_rank(relative(0, 0, to), {last_rank})\n\
         return = pawn && last",
        pawn = id('p', side),
        last_rank = last_rank,
    ));
    let stalemate = compile("return = true");

    let castling = CastlingOptions {
        check_attacks: true,
    };
    let (pawn, king, rook) = (id('p', side), id('k', side), id('r', side));
    RuleSet::new(legality)
        .with_template(MoveTemplate::double_step(pawn.clone(), side))
        .with_template(MoveTemplate::en_passant(pawn.clone(), side, -1, id('p', opp)))
        .with_template(MoveTemplate::en_passant(pawn, side, 1, id('p', opp)))
        .with_template(MoveTemplate::castling(
            king.clone(),
            rook.clone(),
            side,
            3,
            2,
            castling,
        ))
        .with_template(MoveTemplate::castling(king, rook, side, -4, -2, castling))
        .with_event(Event::new(
            checkmate,
            vec![Action::Win(side)],
            MoveState::ThisMove,
        ))
        .with_event(Event::new(
            promotion,
            vec![Action::SetPiece {
                at: Position::TO,
                piece: id('q', side),
            }],
            MoveState::ThisMove,
        ))
        .with_stalemate_event(Event::new(stalemate, vec![Action::Tie], MoveState::ThisMove))
}

/// New game from the initial position
pub fn game() -> Game {
    Game::new(worker(), rules(Color::White), rules(Color::Black))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    #[test]
    fn test_initial() {
        assert_eq!(
            board().as_layout(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(
            Board::from_layout("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap(),
            board()
        );
        let reg = registry();
        assert_eq!(reg.len(), 12);
        assert!(reg.get("k").is_some_and(Piece::is_royal));
        assert!(reg.get("Q").is_some_and(|q| !q.is_royal()));
    }

    #[test]
    fn test_rules_compile() {
        for side in [Color::White, Color::Black] {
            let r = rules(side);
            assert_eq!(r.templates().len(), 5);
            assert_eq!(r.events().len(), 2);
            assert_eq!(r.stalemate_events().len(), 1);
        }
        assert_eq!(
            rules(Color::Black).legality().to_string(),
            "NOT(attacked(next_state,ROYAL_BLACK))"
        );
    }

    #[test]
    fn test_fools_mate() {
        let mut g = game();
        assert_eq!(
            g.push_list("f2f3 e7e5 g2g4 d8h4"),
            Ok(Some(Outcome::Win { side: Color::Black }))
        );
    }

    #[test]
    fn test_stalemate() {
        let board = Board::from_layout("k7/8/1K6/8/8/8/8/2Q5").unwrap();
        let w = MoveWorker::new(board, Arc::new(registry()));
        let mut g = Game::new(w, rules(Color::White), rules(Color::Black));
        assert_eq!(g.push_str("c1c7"), Ok(Some(Outcome::Tie)));
    }

    #[test]
    fn test_black_promotion() {
        let board = Board::from_layout("4k3/8/8/8/8/8/p7/4K3").unwrap();
        let w = MoveWorker::new(board, Arc::new(registry()));
        let mut g = Game::new(w, rules(Color::White), rules(Color::Black));
        g.push_str("e1d2").unwrap();
        g.push_str("a2a1").unwrap();
        assert_eq!(
            g.worker().board().get("a1".parse().unwrap()),
            Some(&"q".into())
        );
    }
}
