//! Rules of one side: legality, special moves and triggered events

use crate::event::Event;
use crate::movegen::MoveList;
use crate::moves::{GameEvent, Move};
use crate::predicate::Predicate;
use crate::template::MoveTemplate;
use crate::transition::BoardTransition;
use crate::worker::MoveWorker;

use chessrules_base::{Color, Coord};

use log::{debug, trace, warn};

/// Rules applied to the moves of one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    legality: Predicate,
    templates: Vec<MoveTemplate>,
    events: Vec<Event>,
    stalemate_events: Vec<Event>,
}

impl RuleSet {
    /// Creates rules where every move must satisfy `legality`
    pub fn new(legality: Predicate) -> RuleSet {
        RuleSet {
            legality,
            templates: Vec::new(),
            events: Vec::new(),
            stalemate_events: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: MoveTemplate) -> RuleSet {
        self.templates.push(template);
        self
    }

    pub fn with_event(mut self, event: Event) -> RuleSet {
        self.events.push(event);
        self
    }

    /// Adds an event to run when the opponent is left without legal moves
    pub fn with_stalemate_event(mut self, event: Event) -> RuleSet {
        self.stalemate_events.push(event);
        self
    }

    #[inline]
    pub fn legality(&self) -> &Predicate {
        &self.legality
    }

    #[inline]
    pub fn templates(&self) -> &[MoveTemplate] {
        &self.templates
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    pub fn stalemate_events(&self) -> &[Event] {
        &self.stalemate_events
    }

    /// Returns `true` if the move of the transition was performed and satisfies the legality rule
    pub fn is_legal(&self, t: &BoardTransition<'_>) -> bool {
        t.is_performed() && self.legality.eval(t)
    }

    fn plain_moves<'a>(
        &'a self,
        worker: &'a MoveWorker,
        side: Color,
    ) -> impl Iterator<Item = Move> + 'a {
        worker
            .raw_moves(side)
            .into_iter()
            .filter(move |mv| self.is_legal(&BoardTransition::with_move(worker, mv.clone())))
    }

    /// Computes all the legal moves of `side`
    ///
    /// Plain moves come first, followed by the moves generated by the templates.
    pub fn legal_moves(&self, worker: &MoveWorker, side: Color) -> MoveList {
        let mut res: MoveList = self.plain_moves(worker, side).collect();
        for t in &self.templates {
            res.extend(t.get_valid_moves(worker, side, &self.legality));
        }
        trace!("{} has {} legal moves", side, res.len());
        res
    }

    /// Returns `true` if `side` has at least one legal move
    pub fn has_legal_moves(&self, worker: &MoveWorker, side: Color) -> bool {
        self.plain_moves(worker, side).next().is_some()
            || self
                .templates
                .iter()
                .any(|t| t.has_valid_moves(worker, side, &self.legality))
    }

    /// Finds a legal move of `side` from `src` to `dst`
    ///
    /// If both a plain move and a special move connect the squares, the plain one is returned.
    pub fn find_move(
        &self,
        worker: &MoveWorker,
        side: Color,
        src: Coord,
        dst: Coord,
    ) -> Option<Move> {
        let plain = worker.piece_at(src).is_some_and(|p| p.owner().is(side))
            && worker.reach(src).all().has(dst);
        if plain {
            let mv = Move::new(src, dst, side);
            if self.is_legal(&BoardTransition::with_move(worker, mv.clone())) {
                return Some(mv);
            }
        }
        self.templates
            .iter()
            .find_map(|t| t.find_move(worker, side, src, dst, &self.legality))
    }

    /// Runs the events triggered by the transition against the live worker
    ///
    /// With `stalemate` set, the stalemate events are run instead of the regular ones. Events
    /// whose actions fail are skipped.
    ///
    /// # Panics
    ///
    /// The function panics if more than one terminal outcome is reported, since such rules
    /// contradict themselves.
    pub fn run_events(
        &self,
        t: &BoardTransition<'_>,
        worker: &mut MoveWorker,
        stalemate: bool,
    ) -> Vec<GameEvent> {
        let events = if stalemate {
            &self.stalemate_events
        } else {
            &self.events
        };
        let fired: Vec<&Event> = events.iter().filter(|e| e.should_run(t)).collect();
        let mut res = Vec::new();
        for e in fired {
            match e.run(worker) {
                Ok(evs) => res.extend(evs),
                Err(err) => warn!("event {} failed: {}", e.predicate(), err),
            }
        }
        let terminal = res.iter().filter(|e| e.is_terminal()).count();
        assert!(
            terminal <= 1,
            "contradictory game outcomes after {}: {:?}",
            t.mv(),
            res
        );
        if !res.is_empty() {
            debug!("events after {}: {:?}", t.mv(), res);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::moves::Action;
    use crate::standard;
    use crate::types::MoveState;

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn names(moves: &MoveList) -> Vec<String> {
        let mut res: Vec<_> = moves.iter().map(|m| m.to_string()).collect();
        res.sort();
        res
    }

    #[test]
    fn test_initial() {
        let w = standard::worker();
        let rules = standard::rules(Color::White);
        let moves = rules.legal_moves(&w, Color::White);
        assert_eq!(moves.len(), 20);
        assert!(rules.has_legal_moves(&w, Color::White));
        assert_eq!(
            rules.find_move(&w, Color::White, coord("e2"), coord("e4")),
            moves.iter().find(|m| m.to_string() == "e2e4").cloned()
        );
        assert!(rules
            .find_move(&w, Color::White, coord("e2"), coord("e4"))
            .is_some_and(|m| m.is_special()));
        assert!(rules
            .find_move(&w, Color::White, coord("e2"), coord("e3"))
            .is_some_and(|m| !m.is_special()));
        assert_eq!(rules.find_move(&w, Color::White, coord("e2"), coord("e5")), None);
        assert_eq!(rules.find_move(&w, Color::Black, coord("e2"), coord("e3")), None);
    }

    #[test]
    fn test_pinned() {
        let reg = std::sync::Arc::new(standard::registry());
        let board = crate::board::Board::from_layout("4k3/4r3/8/8/8/8/4B3/4K3").unwrap();
        let w = MoveWorker::new(board, reg);
        let rules = standard::rules(Color::White);
        let moves = rules.legal_moves(&w, Color::White);
        // The bishop is pinned
        assert_eq!(names(&moves), vec!["e1d1", "e1d2", "e1f1", "e1f2"]);
    }

    #[test]
    fn test_no_moves() {
        let reg = std::sync::Arc::new(standard::registry());
        let board = crate::board::Board::from_layout("k7/2Q5/1K6/8/8/8/8/8").unwrap();
        let w = MoveWorker::new(board, reg);
        let rules = standard::rules(Color::Black);
        assert!(!rules.has_legal_moves(&w, Color::Black));
        assert!(rules.legal_moves(&w, Color::Black).is_empty());
    }

    #[test]
    fn test_run_events() {
        let mut w = standard::worker();
        let rules = RuleSet::new(Predicate::TRUE)
            .with_event(Event::new(
                Predicate::TRUE,
                vec![Action::Win(Color::White)],
                MoveState::ThisMove,
            ))
            .with_event(Event::new(
                Predicate::FALSE,
                vec![Action::Tie],
                MoveState::ThisMove,
            ))
            .with_event(Event::new(
                Predicate::TRUE,
                vec![Action::DeletePiece {
                    at: crate::position::Position::relative(0, 10, crate::position::Anchor::To),
                }],
                MoveState::ThisMove,
            ))
            .with_stalemate_event(Event::new(
                Predicate::TRUE,
                vec![Action::Tie],
                MoveState::ThisMove,
            ));
        let before = w.fork();
        let t = BoardTransition::new(&before, coord("e2"), coord("e3")).unwrap();
        w.make_move(coord("e2"), coord("e3")).unwrap();
        assert_eq!(
            rules.run_events(&t, &mut w, false),
            vec![GameEvent::Win(Color::White)]
        );
        assert_eq!(rules.run_events(&t, &mut w, true), vec![GameEvent::Tie]);
    }

    #[test]
    #[should_panic(expected = "contradictory game outcomes")]
    fn test_contradiction() {
        let mut w = standard::worker();
        let rules = RuleSet::new(Predicate::TRUE)
            .with_event(Event::new(
                Predicate::TRUE,
                vec![Action::Win(Color::White)],
                MoveState::ThisMove,
            ))
            .with_event(Event::new(
                Predicate::TRUE,
                vec![Action::Tie],
                MoveState::ThisMove,
            ));
        let before = w.fork();
        let t = BoardTransition::new(&before, coord("e2"), coord("e3")).unwrap();
        w.make_move(coord("e2"), coord("e3")).unwrap();
        rules.run_events(&t, &mut w, false);
    }
}
