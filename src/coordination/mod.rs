//! Turn coordination module
//!
//! Serializes participants into strict round-robin order over a single
//! shared token. Two interchangeable strategies implement the same
//! `TurnCoordinator` contract: a condition variable (default) and polling.

pub mod condvar;
pub mod polling;
pub mod token;

use std::fmt;
use std::time::Duration;

pub use condvar::CondvarCoordinator;
pub use polling::PollingCoordinator;
pub use token::{TurnGuard, TurnToken};

use crate::domain::ParticipantId;
use crate::error::{Result, TurnstileError};

/// How waiting participants find out the token has moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Block on a condition variable, woken by the advancing participant
    #[default]
    Condvar,
    /// Re-check the token every `interval`
    Polling { interval: Duration },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Condvar => "condvar",
            Strategy::Polling { .. } => "polling",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Condvar => write!(f, "condvar"),
            Strategy::Polling { interval } => write!(f, "polling ({}ms)", interval.as_millis()),
        }
    }
}

/// Grants turns to participants `1..=N` in strict cyclic order.
///
/// The token itself is private to each coordinator, so it only moves through
/// `advance_turn`:
///
/// ```compile_fail
/// use turnstile::coordination::{CondvarCoordinator, TurnCoordinator};
///
/// let coordinator = CondvarCoordinator::new(2);
/// coordinator.token.lock().unwrap();
/// ```
pub trait TurnCoordinator: Send + Sync {
    /// The strategy this coordinator waits with
    fn strategy(&self) -> Strategy;

    /// Number of participants sharing the token
    fn participants(&self) -> u32;

    /// Block until the token names `id`, then return holding it.
    ///
    /// `on_wait` runs once if the participant has to wait at all. Fails with
    /// `Abandoned` once any participant has left the rotation, and with
    /// `Poisoned` if a participant panicked while holding the token.
    fn wait_for_turn(
        &self,
        id: ParticipantId,
        on_wait: &mut dyn FnMut(ParticipantId) -> Result<()>,
    ) -> Result<TurnGuard<'_>>;

    /// Pass the token on and release it. Returns the next holder.
    fn advance_turn(&self, turn: TurnGuard<'_>) -> Result<ParticipantId>;

    /// Mark the rotation abandoned by `id` and wake every waiter.
    ///
    /// Works on a poisoned lock too, since it runs while participants unwind.
    fn abandon(&self, id: ParticipantId);

    /// Current token holder
    fn current(&self) -> Result<ParticipantId>;

    /// Every grant so far, in token order
    fn grant_sequence(&self) -> Result<Vec<ParticipantId>>;
}

/// Build a coordinator for `participants` participants using `strategy`.
pub fn coordinator_for(strategy: Strategy, participants: u32) -> Result<Box<dyn TurnCoordinator>> {
    if participants == 0 {
        return Err(TurnstileError::InvalidConfig(
            "at least one participant is required".to_string(),
        ));
    }

    Ok(match strategy {
        Strategy::Condvar => Box::new(CondvarCoordinator::new(participants)),
        Strategy::Polling { interval } => Box::new(PollingCoordinator::new(participants, interval)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::Condvar.name(), "condvar");
        assert_eq!(Strategy::Polling { interval: Duration::from_millis(5) }.name(), "polling");
        assert_eq!(Strategy::default(), Strategy::Condvar);
    }

    #[test]
    fn test_strategy_display() {
        let polling = Strategy::Polling { interval: Duration::from_millis(5) };
        assert_eq!(polling.to_string(), "polling (5ms)");
        assert_eq!(Strategy::Condvar.to_string(), "condvar");
    }

    #[test]
    fn test_coordinator_for_builds_requested_strategy() {
        let condvar = coordinator_for(Strategy::Condvar, 3).unwrap();
        assert_eq!(condvar.strategy(), Strategy::Condvar);
        assert_eq!(condvar.participants(), 3);

        let polling = Strategy::Polling { interval: Duration::from_millis(2) };
        assert_eq!(coordinator_for(polling, 2).unwrap().strategy(), polling);
    }

    #[test]
    fn test_coordinator_for_rejects_zero_participants() {
        assert!(matches!(
            coordinator_for(Strategy::Condvar, 0),
            Err(TurnstileError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_thread_full_cycle() {
        let coordinator = coordinator_for(Strategy::Condvar, 3).unwrap();
        for raw in [1, 2, 3, 1] {
            let id = ParticipantId::new(raw);
            let guard = coordinator.wait_for_turn(id, &mut |_| Ok(())).unwrap();
            coordinator.advance_turn(guard).unwrap();
        }
        let grants: Vec<u32> = coordinator
            .grant_sequence()
            .unwrap()
            .iter()
            .map(|id| id.get())
            .collect();
        assert_eq!(grants, vec![1, 2, 3, 1]);
        assert_eq!(coordinator.current().unwrap(), ParticipantId::new(2));
    }
}
