//! Turn events and their console messages.

use serde::{Deserialize, Serialize};

use crate::domain::participant::ParticipantId;

/// What happened to a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnEventKind {
    /// Started waiting because the token is held elsewhere
    Waiting,
    /// Granted a turn
    Granted,
    /// Took its final turn
    Completed,
}

/// A single observable step of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub participant: ParticipantId,
    pub kind: TurnEventKind,
}

impl TurnEvent {
    pub fn new(participant: ParticipantId, kind: TurnEventKind) -> Self {
        Self { participant, kind }
    }

    pub fn waiting(participant: ParticipantId) -> Self {
        Self::new(participant, TurnEventKind::Waiting)
    }

    pub fn granted(participant: ParticipantId) -> Self {
        Self::new(participant, TurnEventKind::Granted)
    }

    pub fn completed(participant: ParticipantId) -> Self {
        Self::new(participant, TurnEventKind::Completed)
    }

    /// The console line for this event, trailing newline included.
    pub fn message(&self) -> String {
        format_message(self.participant, self.kind)
    }
}

/// Render the console line for `kind` happening to participant `id`.
pub fn format_message(id: ParticipantId, kind: TurnEventKind) -> String {
    match kind {
        TurnEventKind::Waiting => format!("Not thread {}'s turn.\n", id),
        TurnEventKind::Granted => format!("Thread {}'s turn!\n", id),
        TurnEventKind::Completed => format!("Thread {} completed.\n", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_message() {
        assert_eq!(
            format_message(ParticipantId::new(2), TurnEventKind::Waiting),
            "Not thread 2's turn.\n"
        );
    }

    #[test]
    fn test_granted_message() {
        assert_eq!(
            format_message(ParticipantId::new(1), TurnEventKind::Granted),
            "Thread 1's turn!\n"
        );
    }

    #[test]
    fn test_completed_message() {
        assert_eq!(
            format_message(ParticipantId::new(3), TurnEventKind::Completed),
            "Thread 3 completed.\n"
        );
    }

    #[test]
    fn test_event_message_matches_format() {
        let event = TurnEvent::granted(ParticipantId::new(12));
        assert_eq!(event.message(), "Thread 12's turn!\n");
    }

    #[test]
    fn test_event_serialization() {
        let event = TurnEvent::completed(ParticipantId::new(1));
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json, serde_json::json!({ "participant": 1, "kind": "completed" }));
    }
}
