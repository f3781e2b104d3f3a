//! Runner module - puts participants on threads and drives them.
//!
//! - TurnRunner spawns and joins one thread per participant
//! - run_participant walks a single participant through its turns
//! - EventSink implementations receive the participants' events
//! - ActiveMonitor checks that turns never overlap

mod driver;
mod monitor;
mod participant_runner;
mod sink;

pub use driver::{RunnerConfig, TurnRunner};
pub use monitor::{ActiveMonitor, ActiveSection};
pub use participant_runner::run_participant;
pub use sink::{ConsoleSink, EventSink, MemorySink};
