//! Polling coordinator.
//!
//! Waiters lock, compare, unlock and sleep for a fixed interval before trying
//! again. Wakeup latency is bounded only by the interval. Kept for comparison
//! with the condition-variable coordinator.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, trace};

use super::token::{TurnGuard, TurnToken, poisoned};
use super::{Strategy, TurnCoordinator};
use crate::domain::ParticipantId;
use crate::error::Result;

/// Busy-waits on the token, sleeping `interval` between checks.
#[derive(Debug)]
pub struct PollingCoordinator {
    participants: u32,
    interval: Duration,
    token: Mutex<TurnToken>,
}

impl PollingCoordinator {
    /// A zero interval yields to the scheduler between checks instead of sleeping.
    pub fn new(participants: u32, interval: Duration) -> Self {
        Self {
            participants,
            interval,
            token: Mutex::new(TurnToken::new(participants)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn pause(&self) {
        if self.interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.interval);
        }
    }
}

impl TurnCoordinator for PollingCoordinator {
    fn strategy(&self) -> Strategy {
        Strategy::Polling { interval: self.interval }
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

        let mut polls: u64 = 0;
        loop {
            let token = self.token.lock().map_err(poisoned)?;
            token.ensure_open()?;
            if token.is_turn_of(id) {
                if polls > 0 {
                    debug!("Participant {} got its turn after {} polls", id, polls);
                }
                return Ok(TurnGuard::new(id, token, None));
            }
            drop(token);

            if polls == 0 {
                on_wait(id)?;
            }
            polls += 1;
            trace!("Participant {} poll {}", id, polls);
            self.pause();
        }
    }

    fn advance_turn(&self, turn: TurnGuard<'_>) -> Result<ParticipantId> {
        turn.release()
    }

    fn abandon(&self, id: ParticipantId) {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).abandon(id);
    }

    fn current(&self) -> Result<ParticipantId> {
        Ok(self.token.lock().map_err(poisoned)?.current())
    }

    fn grant_sequence(&self) -> Result<Vec<ParticipantId>> {
        Ok(self.token.lock().map_err(poisoned)?.grants().to_vec())
    }
}
