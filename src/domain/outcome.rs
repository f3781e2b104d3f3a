//! Run outcome types.
//!
//! This module defines what a participant and a whole run report back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::participant::ParticipantId;
use crate::error::Result;

/// Result of one participant's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    pub participant: ParticipantId,
    pub turns_taken: u32,
}

/// Summary of a complete coordinated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of participants
    pub participants: u32,
    /// Turns each participant had to take
    pub target_turns: u32,
    /// Synchronization strategy name
    pub strategy: String,
    /// When the first participant was spawned
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
    /// Participant IDs in the order their turns advanced the token
    pub grants: Vec<ParticipantId>,
    /// Per-participant results, ordered by ID
    pub outcomes: Vec<ParticipantOutcome>,
    /// Highest number of participants ever active at the same time
    pub max_active: usize,
}

impl RunReport {
    /// Returns true if the grants are exactly the expected round-robin cycle
    pub fn is_round_robin(&self) -> bool {
        self.grants == expected_grants(self.participants, self.target_turns)
    }

    /// Returns true if every participant took its full share of turns
    pub fn all_completed(&self) -> bool {
        self.outcomes.len() == self.participants as usize
            && self.outcomes.iter().all(|o| o.turns_taken == self.target_turns)
    }

    /// Total number of turns granted
    pub fn total_turns(&self) -> usize {
        self.grants.len()
    }

    /// Pretty-printed JSON, grants as plain integers
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The grant sequence of a correct run: `1..=participants`, `target_turns` times.
pub fn expected_grants(participants: u32, target_turns: u32) -> Vec<ParticipantId> {
    (0..target_turns)
        .flat_map(|_| ParticipantId::all(participants))
        .collect()
}
