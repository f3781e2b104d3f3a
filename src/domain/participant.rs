//! Participant identity and per-participant state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TurnstileError};

/// Identifier of a participant, in `1..=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u32);

impl ParticipantId {
    /// The participant that holds the token first.
    pub const FIRST: ParticipantId = ParticipantId(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The participant after this one, wrapping from `participants` back to 1.
    pub fn next(&self, participants: u32) -> Self {
        if self.0 >= participants { Self::FIRST } else { Self(self.0 + 1) }
    }

    /// Check that this ID names one of `participants` participants.
    pub fn validate(&self, participants: u32) -> Result<()> {
        if self.0 == 0 || self.0 > participants {
            return Err(TurnstileError::UnknownParticipant(self.0));
        }
        Ok(())
    }

    /// All IDs `1..=participants`, in turn order.
    pub fn all(participants: u32) -> impl Iterator<Item = ParticipantId> {
        (1..=participants).map(ParticipantId)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a participant is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantState {
    /// Token held by someone else
    Waiting,
    /// Holding the token, performing its turn
    Active,
    /// Took every required turn
    Done,
}

impl ParticipantState {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParticipantState::Done)
    }
}

/// A participant's private view of its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    target_turns: u32,
    turns_taken: u32,
    state: ParticipantState,
}

impl Participant {
    pub fn new(id: ParticipantId, target_turns: u32) -> Self {
        Self {
            id,
            target_turns,
            turns_taken: 0,
            state: ParticipantState::Waiting,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn target_turns(&self) -> u32 {
        self.target_turns
    }

    pub fn state(&self) -> ParticipantState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    /// Waiting -> Active, once the token matches this participant.
    pub fn begin_turn(&mut self) -> Result<()> {
        match self.state {
            ParticipantState::Waiting => {
                self.state = ParticipantState::Active;
                Ok(())
            }
            other => Err(TurnstileError::InvalidState(format!(
                "participant {} cannot begin a turn while {:?}",
                self.id, other
            ))),
        }
    }

    /// Active -> Waiting, or Active -> Done when the final turn was taken.
    pub fn finish_turn(&mut self) -> Result<ParticipantState> {
        if self.state != ParticipantState::Active {
            return Err(TurnstileError::InvalidState(format!(
                "participant {} cannot finish a turn while {:?}",
                self.id, self.state
            )));
        }

        self.turns_taken += 1;
        self.state = if self.turns_taken >= self.target_turns {
            ParticipantState::Done
        } else {
            ParticipantState::Waiting
        };
        Ok(self.state)
    }
}
