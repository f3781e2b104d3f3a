//! Turn runner - spawns one thread per participant and joins them all.
//!
//! The runner:
//! 1. Builds a coordinator for the configured strategy
//! 2. Spawns participants `1..=N` as named scoped threads
//! 3. Joins every participant
//! 4. Collects the grant sequence and outcomes into a `RunReport`

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::coordination::{Strategy, coordinator_for};
use crate::domain::{ParticipantId, ParticipantOutcome, RunReport};
use crate::error::{Result, TurnstileError};
use crate::runner::monitor::ActiveMonitor;
use crate::runner::participant_runner::run_participant;
use crate::runner::sink::{ConsoleSink, EventSink};

/// Configuration for a TurnRunner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Number of participants (N).
    pub participants: u32,
    /// Turns each participant must take.
    pub target_turns: u32,
    /// How waiting participants learn the token moved.
    pub strategy: Strategy,
    /// Pause before spawning each participant.
    pub start_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            participants: 3,
            target_turns: 3,
            strategy: Strategy::Condvar,
            start_delay: Duration::ZERO,
        }
    }
}

impl RunnerConfig {
    pub fn new(participants: u32, target_turns: u32) -> Self {
        Self {
            participants,
            target_turns,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.participants == 0 {
            return Err(TurnstileError::InvalidConfig(
                "participants must be > 0".to_string(),
            ));
        }
        if self.target_turns == 0 {
            return Err(TurnstileError::InvalidConfig(
                "target-turns must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs a full round of turn taking.
pub struct TurnRunner {
    config: RunnerConfig,
    sink: Arc<dyn EventSink>,
}

impl TurnRunner {
    /// A runner that prints events to stdout.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            sink: Arc::new(ConsoleSink),
        }
    }

    /// Send events somewhere other than stdout.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run every participant to completion and report how it went.
    ///
    /// Every spawned participant is joined even when one of them fails. The
    /// error returned is the one that caused the run to fail, not the
    /// knock-on `Abandoned` or `Poisoned` errors the others saw.
    pub fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let RunnerConfig {
            participants,
            target_turns,
            strategy,
            start_delay,
        } = self.config.clone();

        let coordinator = coordinator_for(strategy, participants)?;
        let monitor = ActiveMonitor::new();
        let started_at = Utc::now();
        let clock = Instant::now();

        info!(
            "Starting run: {} participants, {} turns each, strategy {}",
            participants, target_turns, strategy
        );

        let outcomes = thread::scope(|s| -> Result<Vec<ParticipantOutcome>> {
            let coordinator = coordinator.as_ref();
            let sink = self.sink.as_ref();
            let monitor = &monitor;

            let mut failures = Vec::new();
            let mut handles = Vec::with_capacity(participants as usize);
            for id in ParticipantId::all(participants) {
                if !start_delay.is_zero() {
                    thread::sleep(start_delay);
                }
                let spawned = thread::Builder::new()
                    .name(format!("participant-{}", id))
                    .spawn_scoped(s, move || {
                        run_participant(coordinator, sink, monitor, id, target_turns)
                    });
                match spawned {
                    Ok(handle) => {
                        debug!("Spawned participant {}", id);
                        handles.push((id, handle));
                    }
                    Err(e) => {
                        error!("Failed to spawn participant {}: {}", id, e);
                        coordinator.abandon(id);
                        failures.push(TurnstileError::from(e));
                        break;
                    }
                }
            }

            let mut outcomes = Vec::with_capacity(handles.len());
            for (id, handle) in handles {
                match handle.join() {
                    Ok(Ok(outcome)) => {
                        debug!("Joined participant {} after {} turns", id, outcome.turns_taken);
                        outcomes.push(outcome);
                    }
                    Ok(Err(e)) => {
                        warn!("Participant {} failed: {}", id, e);
                        failures.push(e);
                    }
                    Err(_) => {
                        error!("Participant {} panicked", id);
                        failures.push(TurnstileError::ParticipantPanicked(id.get()));
                    }
                }
            }

            match failures.into_iter().min_by_key(failure_rank) {
                Some(e) => Err(e),
                None => Ok(outcomes),
            }
        })?;

        let report = RunReport {
            participants,
            target_turns,
            strategy: strategy.name().to_string(),
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            grants: coordinator.grant_sequence()?,
            outcomes,
            max_active: monitor.peak(),
        };

        info!(
            "Run finished in {}ms: {} grants, peak active {}",
            report.elapsed_ms,
            report.total_turns(),
            report.max_active
        );
        Ok(report)
    }
}

/// Lower ranks are closer to the root cause of a failed run.
fn failure_rank(err: &TurnstileError) -> u8 {
    match err {
        TurnstileError::ParticipantPanicked(_) => 0,
        TurnstileError::Poisoned(_) => 2,
        TurnstileError::Abandoned(_) => 3,
        _ => 1,
    }
}
