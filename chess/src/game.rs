//! Game played under a pair of rule sets

use crate::moves::{GameEvent, Move, Notation, NotationError};
use crate::movegen::MoveList;
use crate::ruleset::RuleSet;
use crate::transition::BoardTransition;
use crate::types::Outcome;
use crate::worker::{MoveError, MoveWorker};

use chessrules_base::{Color, Coord};

use std::fmt;

use log::debug;
use thiserror::Error;

/// Error making a move in the game
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum GameError {
    /// The game is already over
    #[error("game is finished")]
    Finished,
    /// Cannot parse the move
    #[error("bad move notation: {0}")]
    Notation(#[from] NotationError),
    /// The move is not legal for the side to move
    #[error("illegal move {0}")]
    Illegal(String),
    /// The move failed to perform
    #[error("cannot perform move: {0}")]
    Perform(#[from] MoveError),
}

/// Error applying a list of moves
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("cannot apply move #{}: {}", .pos + 1, .source)]
pub struct MoveListError {
    pub pos: usize,
    pub source: GameError,
}

/// Sequence of moves from the initial position, with the rules of both sides
///
/// The sides alternate, white moving first. After each move the events of the moving side are
/// run. If they do not end the game and the opponent has no legal moves, the stalemate events of
/// the opponent are run.
#[derive(Debug, Clone)]
pub struct Game {
    worker: MoveWorker,
    rules: [RuleSet; 2],
    side: Color,
    outcomes: Vec<Option<Outcome>>,
}

impl Game {
    pub fn new(worker: MoveWorker, white: RuleSet, black: RuleSet) -> Game {
        Game {
            worker,
            rules: [white, black],
            side: Color::White,
            outcomes: Vec::new(),
        }
    }

    #[inline]
    pub fn worker(&self) -> &MoveWorker {
        &self.worker
    }

    /// Side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn rules(&self, side: Color) -> &RuleSet {
        &self.rules[side.index()]
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Performed moves, oldest first
    pub fn moves(&self) -> &[Move] {
        self.worker.log()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcomes.last().copied().flatten()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Legal moves of the side to move
    pub fn legal_moves(&self) -> MoveList {
        if self.is_finished() {
            return MoveList::new();
        }
        self.rules(self.side).legal_moves(&self.worker, self.side)
    }

    /// Makes the move, which must be legal for the side to move
    pub fn push_move(&mut self, mv: Move) -> Result<Option<Outcome>, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        if mv.side() != self.side || !self.legal_moves().contains(&mv) {
            return Err(GameError::Illegal(mv.to_string()));
        }
        self.do_push(mv)
    }

    /// Makes the legal move from `src` to `dst`
    pub fn push(&mut self, src: Coord, dst: Coord) -> Result<Option<Outcome>, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        let mv = self
            .rules(self.side)
            .find_move(&self.worker, self.side, src, dst)
            .ok_or_else(|| GameError::Illegal(format!("{}{}", src, dst)))?;
        self.do_push(mv)
    }

    /// Makes the move given in coordinate notation, like `e2e4`
    pub fn push_str(&mut self, s: &str) -> Result<Option<Outcome>, GameError> {
        let n: Notation = s.parse()?;
        self.push(n.src, n.dst)
    }

    /// Makes the moves from the whitespace-separated list
    pub fn push_list(&mut self, list: &str) -> Result<Option<Outcome>, MoveListError> {
        let mut res = self.outcome();
        for (pos, token) in list.split_ascii_whitespace().enumerate() {
            res = self
                .push_str(token)
                .map_err(|source| MoveListError { pos, source })?;
        }
        Ok(res)
    }

    fn do_push(&mut self, mv: Move) -> Result<Option<Outcome>, GameError> {
        let side = self.side;
        let before = self.worker.fork();
        let t = BoardTransition::with_move(&before, mv.clone());
        self.worker.perform(mv, true)?;

        let mut events = self.rules[side.index()].run_events(&t, &mut self.worker, false);
        let mut outcome = terminal(&events);
        let opponent = side.inv();
        if outcome.is_none() && !self.rules(opponent).has_legal_moves(&self.worker, opponent) {
            events = self.rules[opponent.index()].run_events(&t, &mut self.worker, true);
            outcome = terminal(&events);
        }

        debug!("{} played {}", side, t.mv());
        if let Some(o) = outcome {
            debug!("game over: {}", o);
        }
        self.outcomes.push(outcome);
        self.side = opponent;
        Ok(outcome)
    }

    /// Takes back the last move, including the effects of the events it triggered
    pub fn pop(&mut self) -> Option<Move> {
        let mv = self.worker.undo()?;
        self.outcomes.pop();
        self.side = self.side.inv();
        Some(mv)
    }

    pub fn move_list(&self) -> MoveListDisplay<'_> {
        MoveListDisplay(self)
    }
}

fn terminal(events: &[GameEvent]) -> Option<Outcome> {
    events.iter().find_map(GameEvent::outcome)
}

/// Moves of the game in coordinate notation, separated by spaces
pub struct MoveListDisplay<'a>(&'a Game);

impl<'a> fmt::Display for MoveListDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, m) in self.0.moves().iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}
