//! Drives a single participant through Waiting -> Active -> (Waiting | Done).

use log::{debug, info, warn};

use crate::coordination::TurnCoordinator;
use crate::domain::{Participant, ParticipantId, ParticipantOutcome, ParticipantState, TurnEvent};
use crate::error::Result;
use crate::runner::monitor::ActiveMonitor;
use crate::runner::sink::EventSink;

/// Abandons the rotation if the participant leaves before finishing,
/// whether by error or by panic.
struct Departure<'a> {
    coordinator: &'a dyn TurnCoordinator,
    id: ParticipantId,
    finished: bool,
}

impl Drop for Departure<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Participant {} leaving before its final turn", self.id);
            self.coordinator.abandon(self.id);
        }
    }
}

/// Take `target_turns` turns as participant `id`, then report completion.
///
/// Blocks inside the coordinator whenever the token is held elsewhere. If
/// this participant fails or panics, every other participant's wait fails
/// instead of blocking forever.
pub fn run_participant(
    coordinator: &dyn TurnCoordinator,
    sink: &dyn EventSink,
    monitor: &ActiveMonitor,
    id: ParticipantId,
    target_turns: u32,
) -> Result<ParticipantOutcome> {
    id.validate(coordinator.participants())?;
    let mut departure = Departure {
        coordinator,
        id,
        finished: false,
    };
    let mut participant = Participant::new(id, target_turns);

    while !participant.is_done() {
        let turn = coordinator.wait_for_turn(id, &mut |id| sink.emit(&TurnEvent::waiting(id)))?;

        {
            let _section = monitor.enter();
            participant.begin_turn()?;
            sink.emit(&TurnEvent::granted(id))?;
        }

        let next = coordinator.advance_turn(turn)?;
        let state = participant.finish_turn()?;
        debug!(
            "Participant {} finished turn {}/{}, next is {}",
            id,
            participant.turns_taken(),
            target_turns,
            next
        );

        if state == ParticipantState::Done {
            sink.emit(&TurnEvent::completed(id))?;
            info!("Participant {} completed", id);
        }
    }

    departure.finished = true;
    Ok(ParticipantOutcome {
        participant: id,
        turns_taken: participant.turns_taken(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{CondvarCoordinator, Strategy, coordinator_for};
    use crate::domain::TurnEventKind;
    use crate::runner::sink::MemorySink;

    #[test]
    fn test_single_participant_runs_alone() {
        let coordinator = CondvarCoordinator::new(1);
        let sink = MemorySink::new();
        let monitor = ActiveMonitor::new();

        let outcome =
            run_participant(&coordinator, &sink, &monitor, ParticipantId::FIRST, 3).unwrap();

        assert_eq!(outcome.turns_taken, 3);
        assert_eq!(
            sink.transcript().unwrap(),
            "Thread 1's turn!\nThread 1's turn!\nThread 1's turn!\nThread 1 completed.\n"
        );
        assert_eq!(monitor.peak(), 1);
        assert_eq!(monitor.active(), 0);
    }

    #[test]
    fn test_completion_follows_final_grant() {
        let coordinator = coordinator_for(Strategy::Condvar, 1).unwrap();
        let sink = MemorySink::new();
        let monitor = ActiveMonitor::new();

        run_participant(coordinator.as_ref(), &sink, &monitor, ParticipantId::FIRST, 2).unwrap();

        let kinds: Vec<TurnEventKind> = sink.events().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![TurnEventKind::Granted, TurnEventKind::Granted, TurnEventKind::Completed]
        );
    }

    #[test]
    fn test_unknown_participant_rejected() {
        let coordinator = CondvarCoordinator::new(2);
        let sink = MemorySink::new();
        let monitor = ActiveMonitor::new();

        let result = run_participant(&coordinator, &sink, &monitor, ParticipantId::new(3), 1);
        assert!(result.is_err());
        assert!(sink.events().unwrap().is_empty());
    }

    #[test]
    fn test_failed_participant_abandons_rotation() {
        let coordinator = CondvarCoordinator::new(1);
        let monitor = ActiveMonitor::new();
        let sink = |event: &TurnEvent| -> Result<()> {
            if event.kind == TurnEventKind::Granted {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into());
            }
            Ok(())
        };
        let sink = FnSink(sink);

        let result = run_participant(&coordinator, &sink, &monitor, ParticipantId::FIRST, 2);
        assert!(matches!(result, Err(crate::error::TurnstileError::Io(_))));
        assert_eq!(monitor.active(), 0);
        assert!(matches!(
            coordinator.wait_for_turn(ParticipantId::FIRST, &mut |_| Ok(())),
            Err(crate::error::TurnstileError::Abandoned(1))
        ));
    }

    #[test]
    fn test_finished_participant_leaves_rotation_open() {
        let coordinator = CondvarCoordinator::new(1);
        let sink = MemorySink::new();
        let monitor = ActiveMonitor::new();

        run_participant(&coordinator, &sink, &monitor, ParticipantId::FIRST, 1).unwrap();
        assert!(
            coordinator
                .wait_for_turn(ParticipantId::FIRST, &mut |_| Ok(()))
                .is_ok()
        );
    }

    struct FnSink<F>(F);

    impl<F> EventSink for FnSink<F>
    where
        F: Fn(&TurnEvent) -> Result<()> + Send + Sync,
    {
        fn emit(&self, event: &TurnEvent) -> Result<()> {
            (self.0)(event)
        }
    }
}
