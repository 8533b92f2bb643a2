//! Update scheduling and suspension

use log::{debug, trace};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Gate for the periodic update cycle
///
/// Updates run unless at least one [`UpdateSuspendGuard`] is alive. Guards
/// nest: the cycle resumes when the last one is dropped.
#[derive(Debug)]
pub struct UpdateScheduler {
    suspended: Arc<AtomicUsize>,
    interval: Duration,
    frame_count: u64,
}

impl UpdateScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            suspended: Arc::new(AtomicUsize::new(0)),
            interval,
            frame_count: 0,
        }
    }

    /// Pause updates until the returned guard is dropped
    pub fn suspend(&self) -> UpdateSuspendGuard {
        let depth = self.suspended.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Updates suspended (depth {})", depth);
        UpdateSuspendGuard {
            suspended: Arc::clone(&self.suspended),
        }
    }

    pub fn is_running(&self) -> bool {
        self.suspended.load(Ordering::SeqCst) == 0
    }

    /// Cloneable read-only view of the suspension state
    pub fn status(&self) -> UpdateStatus {
        UpdateStatus {
            suspended: Arc::clone(&self.suspended),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Number of update cycles that actually ran
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Record the start of a cycle. Returns false while suspended.
    pub(crate) fn begin_frame(&mut self) -> bool {
        if !self.is_running() {
            trace!("Skipping update cycle: suspended");
            return false;
        }
        self.frame_count += 1;
        true
    }
}

/// Read-only view of whether updates are running
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    suspended: Arc<AtomicUsize>,
}

impl UpdateStatus {
    pub fn is_running(&self) -> bool {
        self.suspended.load(Ordering::SeqCst) == 0
    }
}

/// Keeps updates paused while alive
///
/// Resumes on drop, whichever way the scope holding it is left.
#[must_use = "updates resume as soon as the guard is dropped"]
#[derive(Debug)]
pub struct UpdateSuspendGuard {
    suspended: Arc<AtomicUsize>,
}

impl Drop for UpdateSuspendGuard {
    fn drop(&mut self) {
        let depth = self.suspended.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Update suspension released (depth {})", depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_suspends_and_resumes() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(10));
        assert!(scheduler.is_running());
        {
            let _guard = scheduler.suspend();
            assert!(!scheduler.is_running());
        }
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_status_tracks_scheduler() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(10));
        let status = scheduler.status();
        let guard = scheduler.suspend();
        assert!(!status.is_running());
        drop(guard);
        assert!(status.is_running());
    }

    #[test]
    fn test_guards_nest() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(10));
        let outer = scheduler.suspend();
        let inner = scheduler.suspend();
        drop(inner);
        assert!(!scheduler.is_running());
        drop(outer);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_resumes_on_early_return() {
        fn prompt(scheduler: &UpdateScheduler, cancel: bool) -> Option<u32> {
            let _guard = scheduler.suspend();
            if cancel {
                return None;
            }
            Some(1)
        }

        let scheduler = UpdateScheduler::new(Duration::from_millis(10));
        assert_eq!(prompt(&scheduler, true), None);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_begin_frame_counts_only_running_cycles() {
        let mut scheduler = UpdateScheduler::new(Duration::from_millis(10));
        assert!(scheduler.begin_frame());
        let guard = scheduler.suspend();
        assert!(!scheduler.begin_frame());
        drop(guard);
        assert_eq!(scheduler.frame_count(), 1);
    }
}
