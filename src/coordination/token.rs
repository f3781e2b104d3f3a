//! The shared turn token and the guard proving a participant holds it.

use std::sync::{Condvar, MutexGuard, PoisonError};

use crate::domain::ParticipantId;
use crate::error::{Result, TurnstileError};

/// Whose turn it is, plus the history of granted turns.
///
/// Not synchronized by itself; coordinators keep it behind a `Mutex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnToken {
    participants: u32,
    current: ParticipantId,
    grants: Vec<ParticipantId>,
    abandoned_by: Option<ParticipantId>,
}

impl TurnToken {
    /// A token for `participants` participants, held first by participant 1.
    pub fn new(participants: u32) -> Self {
        Self {
            participants,
            current: ParticipantId::FIRST,
            grants: Vec::new(),
            abandoned_by: None,
        }
    }

    pub fn participants(&self) -> u32 {
        self.participants
    }

    pub fn current(&self) -> ParticipantId {
        self.current
    }

    pub fn is_turn_of(&self, id: ParticipantId) -> bool {
        self.current == id
    }

    /// Grants recorded so far, in the order the token moved.
    pub fn grants(&self) -> &[ParticipantId] {
        &self.grants
    }

    /// The first participant that left without finishing, if any.
    pub fn abandoned_by(&self) -> Option<ParticipantId> {
        self.abandoned_by
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned_by.is_some()
    }

    /// Fails once any participant has abandoned the rotation.
    pub(crate) fn ensure_open(&self) -> Result<()> {
        match self.abandoned_by {
            Some(id) => Err(TurnstileError::Abandoned(id.get())),
            None => Ok(()),
        }
    }

    /// Record that `id` left the rotation. The first abandoner is kept.
    pub(crate) fn abandon(&mut self, id: ParticipantId) {
        if self.abandoned_by.is_none() {
            self.abandoned_by = Some(id);
        }
    }

    /// Pass the token from `id` to the next participant, wrapping N -> 1.
    pub(crate) fn advance(&mut self, id: ParticipantId) -> Result<ParticipantId> {
        if !self.is_turn_of(id) {
            return Err(TurnstileError::NotYourTurn {
                id: id.get(),
                current: self.current.get(),
            });
        }

        self.grants.push(id);
        self.current = id.next(self.participants);
        log::debug!("Token advanced {} -> {}", id, self.current);
        Ok(self.current)
    }
}

/// Exclusive access to the token while it names `id`.
///
/// Only coordinators hand these out, and only once the token matches. Handing
/// it back through `TurnCoordinator::advance_turn` is the single way to move
/// the token. Dropping it any other way (an error or a panic mid-turn)
/// abandons the rotation so waiters fail instead of blocking forever.
pub struct TurnGuard<'a> {
    id: ParticipantId,
    token: Option<MutexGuard<'a, TurnToken>>,
    wakeup: Option<&'a Condvar>,
    released: bool,
}

impl<'a> TurnGuard<'a> {
    pub(crate) fn new(
        id: ParticipantId,
        token: MutexGuard<'a, TurnToken>,
        wakeup: Option<&'a Condvar>,
    ) -> Self {
        Self {
            id,
            token: Some(token),
            wakeup,
            released: false,
        }
    }

    /// The participant whose turn this is.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Advance the token, drop the lock and wake waiters. Returns the next holder.
    pub(crate) fn release(mut self) -> Result<ParticipantId> {
        let next = match self.token.as_mut() {
            Some(token) => token.advance(self.id)?,
            None => {
                return Err(TurnstileError::InvalidState(format!(
                    "turn of participant {} already released",
                    self.id
                )));
            }
        };
        self.released = true;
        Ok(next)
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut token) = self.token.take() {
            if !self.released {
                log::warn!("Participant {} gave up its turn without passing the token", self.id);
                token.abandon(self.id);
            }
            drop(token);
        }
        if let Some(wakeup) = self.wakeup {
            wakeup.notify_all();
        }
    }
}

impl std::fmt::Debug for TurnGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnGuard").field("id", &self.id).finish_non_exhaustive()
    }
}

pub(crate) fn poisoned<T>(err: PoisonError<T>) -> TurnstileError {
    TurnstileError::Poisoned(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn id(raw: u32) -> ParticipantId {
        ParticipantId::new(raw)
    }

    #[test]
    fn test_new_token_starts_at_first() {
        let token = TurnToken::new(3);
        assert_eq!(token.current(), id(1));
        assert!(token.grants().is_empty());
        assert!(!token.is_abandoned());
        assert!(token.ensure_open().is_ok());
    }

    #[test]
    fn test_advance_cycles() {
        let mut token = TurnToken::new(3);
        assert_eq!(token.advance(id(1)).unwrap(), id(2));
        assert_eq!(token.advance(id(2)).unwrap(), id(3));
        assert_eq!(token.advance(id(3)).unwrap(), id(1));
        assert_eq!(token.grants(), &[id(1), id(2), id(3)]);
    }

    #[test]
    fn test_advance_single_participant_wraps_to_self() {
        let mut token = TurnToken::new(1);
        for _ in 0..3 {
            assert_eq!(token.advance(id(1)).unwrap(), id(1));
        }
        assert_eq!(token.grants(), &[id(1), id(1), id(1)]);
    }

    #[test]
    fn test_advance_out_of_turn_rejected() {
        let mut token = TurnToken::new(3);
        let err = token.advance(id(2)).unwrap_err();
        assert!(matches!(err, TurnstileError::NotYourTurn { id: 2, current: 1 }));
        assert_eq!(token.current(), id(1));
        assert!(token.grants().is_empty());
    }

    #[test]
    fn test_abandon_keeps_first() {
        let mut token = TurnToken::new(3);
        token.abandon(id(2));
        token.abandon(id(3));
        assert_eq!(token.abandoned_by(), Some(id(2)));
        assert!(matches!(token.ensure_open(), Err(TurnstileError::Abandoned(2))));
    }

    #[test]
    fn test_guard_release_advances_and_unlocks() {
        let mutex = Mutex::new(TurnToken::new(2));
        let guard = TurnGuard::new(id(1), mutex.lock().unwrap(), None);
        assert_eq!(guard.id(), id(1));
        assert_eq!(guard.release().unwrap(), id(2));

        // lock is free again
        let token = mutex.try_lock().unwrap();
        assert_eq!(token.current(), id(2));
        assert!(!token.is_abandoned());
    }

    #[test]
    fn test_dropped_guard_abandons_rotation() {
        let mutex = Mutex::new(TurnToken::new(2));
        {
            let _guard = TurnGuard::new(id(1), mutex.lock().unwrap(), None);
        }

        let token = mutex.try_lock().unwrap();
        assert_eq!(token.current(), id(1));
        assert_eq!(token.abandoned_by(), Some(id(1)));
    }
}
