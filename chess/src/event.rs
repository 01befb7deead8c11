//! Actions triggered by moves

use crate::moves::{Action, GameEvent};
use crate::predicate::Predicate;
use crate::transition::BoardTransition;
use crate::types::MoveState;
use crate::worker::{MoveError, MoveWorker};

use std::sync::Arc;

use log::debug;

/// Rule which performs actions after a move satisfying its predicate
///
/// The action positions resolve against the endpoints of the move selected by `pivot`:
/// `ThisMove` is the newest move in the log of the live worker, `LastMove` is the one before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    predicate: Predicate,
    actions: Arc<[Action]>,
    pivot: MoveState,
}

impl Event {
    pub fn new(predicate: Predicate, actions: impl Into<Arc<[Action]>>, pivot: MoveState) -> Event {
        Event {
            predicate,
            actions: actions.into(),
            pivot,
        }
    }

    #[inline]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[inline]
    pub fn pivot(&self) -> MoveState {
        self.pivot
    }

    /// Returns `true` if the event fires for the transition
    pub fn should_run(&self, t: &BoardTransition<'_>) -> bool {
        self.predicate.eval(t)
    }

    /// Performs the actions against the live worker
    ///
    /// Fails with [`MoveError::NoPivot`] if the log has no pivot move. Actions preceding a
    /// failed one stay applied.
    pub fn run(&self, worker: &mut MoveWorker) -> Result<Vec<GameEvent>, MoveError> {
        let back = match self.pivot {
            MoveState::ThisMove => 0,
            MoveState::LastMove => 1,
        };
        let mv = worker.move_back(back).ok_or(MoveError::NoPivot(back))?;
        let (from, to) = (mv.src(), mv.dst());
        debug!("running event {} at {}{}", self.predicate, from, to);
        worker.run_actions(&self.actions, from, to)
    }
}
