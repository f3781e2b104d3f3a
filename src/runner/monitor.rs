//! Active-section instrumentation.
//!
//! Counts how many participants are inside their turn at the same moment.
//! A correct coordinator never lets the peak exceed 1.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks concurrently active participants and the peak seen.
#[derive(Debug, Default)]
pub struct ActiveMonitor {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ActiveMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the caller active until the returned section is dropped.
    pub fn enter(&self) -> ActiveSection<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if now > 1 {
            log::error!("{} participants active at once", now);
        }
        ActiveSection { monitor: self }
    }

    /// Participants active right now
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest concurrent count observed
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// An open active section; leaving happens on drop.
#[derive(Debug)]
pub struct ActiveSection<'a> {
    monitor: &'a ActiveMonitor,
}

impl Drop for ActiveSection<'_> {
    fn drop(&mut self) {
        self.monitor.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave() {
        let monitor = ActiveMonitor::new();
        {
            let _section = monitor.enter();
            assert_eq!(monitor.active(), 1);
        }
        assert_eq!(monitor.active(), 0);
        assert_eq!(monitor.peak(), 1);
    }

    #[test]
    fn test_peak_records_overlap() {
        let monitor = ActiveMonitor::new();
        let a = monitor.enter();
        let b = monitor.enter();
        assert_eq!(monitor.peak(), 2);
        drop(a);
        drop(b);
        assert_eq!(monitor.active(), 0);
        assert_eq!(monitor.peak(), 2);
    }
}
