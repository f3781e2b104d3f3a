//! Domain types for Turnstile
//!
//! - ParticipantId / Participant: identity and the Waiting/Active/Done state machine
//! - TurnEvent: what a participant reports, and its literal console message
//! - RunReport: summary of a coordinated run

pub mod event;
pub mod outcome;
pub mod participant;

pub use event::{TurnEvent, TurnEventKind, format_message};
pub use outcome::{ParticipantOutcome, RunReport, expected_grants};
pub use participant::{Participant, ParticipantId, ParticipantState};
