//! Condition-variable coordinator.
//!
//! Waiters block on a `Condvar` and re-check the token under the same mutex
//! that guards mutation. The participant that advances the token wakes every
//! waiter after the lock is released, so no wakeup can be missed.

use std::sync::{Condvar, Mutex, PoisonError};

use log::debug;

use super::token::{TurnGuard, TurnToken, poisoned};
use super::{Strategy, TurnCoordinator};
use crate::domain::ParticipantId;
use crate::error::Result;

/// Blocks waiters on a condition variable until the token names them.
#[derive(Debug)]
pub struct CondvarCoordinator {
    participants: u32,
    token: Mutex<TurnToken>,
    turn_changed: Condvar,
}

impl CondvarCoordinator {
    pub fn new(participants: u32) -> Self {
        Self {
            participants,
            token: Mutex::new(TurnToken::new(participants)),
            turn_changed: Condvar::new(),
        }
    }
}

impl TurnCoordinator for CondvarCoordinator {
    fn strategy(&self) -> Strategy {
        Strategy::Condvar
    }

    fn participants(&self) -> u32 {
        self.participants
    }

    fn wait_for_turn(
        &self,
        id: ParticipantId,
        on_wait: &mut dyn FnMut(ParticipantId) -> Result<()>,
    ) -> Result<TurnGuard<'_>> {
        id.validate(self.participants)?;

        let mut token = self.token.lock().map_err(poisoned)?;
        token.ensure_open()?;
        if !token.is_turn_of(id) {
            on_wait(id)?;
            debug!("Participant {} waiting, token held by {}", id, token.current());
            token = self
                .turn_changed
                .wait_while(token, |t| !t.is_turn_of(id) && !t.is_abandoned())
                .map_err(poisoned)?;
            token.ensure_open()?;
        }

        Ok(TurnGuard::new(id, token, Some(&self.turn_changed)))
    }

    fn advance_turn(&self, turn: TurnGuard<'_>) -> Result<ParticipantId> {
        // waiters are woken when the guard drops, after the lock is released
        turn.release()
    }

    fn abandon(&self, id: ParticipantId) {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        token.abandon(id);
        drop(token);
        self.turn_changed.notify_all();
    }

    fn current(&self) -> Result<ParticipantId> {
        Ok(self.token.lock().map_err(poisoned)?.current())
    }

    fn grant_sequence(&self) -> Result<Vec<ParticipantId>> {
        Ok(self.token.lock().map_err(poisoned)?.grants().to_vec())
    }
}
