//! Event sinks - where participants report what they are doing.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::coordination::token::poisoned;
use crate::domain::TurnEvent;
use crate::error::Result;

/// Receives participant events, possibly from many threads at once.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TurnEvent) -> Result<()>;
}

/// Writes each event's literal message to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: &TurnEvent) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(event.message().as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Records events in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TurnEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Result<Vec<TurnEvent>> {
        Ok(self.events.lock().map_err(poisoned)?.clone())
    }

    /// The rendered console output, concatenated
    pub fn transcript(&self) -> Result<String> {
        Ok(self.events()?.iter().map(TurnEvent::message).collect())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &TurnEvent) -> Result<()> {
        self.events.lock().map_err(poisoned)?.push(*event);
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &TurnEvent) -> Result<()> {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: &TurnEvent) -> Result<()> {
        (**self).emit(event)
    }
}
