//! Automated snapshot schedule
//!
//! A background worker that periodically invokes the snapshot engine and then
//! the retention manager. The worker waits on a channel with a timeout, so
//! `stop()` wakes it immediately instead of waiting out the interval; an
//! in-flight fire always completes before the worker exits.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::backup::engine::SnapshotEngine;
use crate::backup::retention::RetentionManager;

/// Result of a `start` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a `stop` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Point-in-time view of the schedule
#[derive(Debug, Clone)]
pub struct ScheduleStatus {
    pub running: bool,
    pub interval: Option<Duration>,
    pub next_fire_at: Option<DateTime<Utc>>,
}

struct Worker {
    tx: Sender<()>,
    handle: JoinHandle<()>,
    interval: Duration,
}

/// Drives the automated snapshot schedule
///
/// At most one worker thread exists per scheduler; `start` on a running
/// schedule is a no-op and says so.
pub struct Scheduler {
    engine: Arc<SnapshotEngine>,
    retention: Arc<RetentionManager>,
    max_snapshots: u32,
    worker: Mutex<Option<Worker>>,
    next_fire_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl Scheduler {
    pub fn new(
        engine: Arc<SnapshotEngine>,
        retention: Arc<RetentionManager>,
        max_snapshots: u32,
    ) -> Self {
        Self {
            engine,
            retention,
            max_snapshots,
            worker: Mutex::new(None),
            next_fire_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the schedule, firing every `interval_hours`
    pub fn start(&self, interval_hours: u64) -> StartOutcome {
        self.start_with_interval(Duration::from_secs(interval_hours * 3600))
    }

    pub(crate) fn start_with_interval(&self, interval: Duration) -> StartOutcome {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            warn!("snapshot schedule already running");
            return StartOutcome::AlreadyRunning;
        }

        let (tx, rx) = mpsc::channel::<()>();
        let engine = Arc::clone(&self.engine);
        let retention = Arc::clone(&self.retention);
        let next_fire_at = Arc::clone(&self.next_fire_at);
        let max_snapshots = self.max_snapshots;

        set_next_fire(&next_fire_at, Some(after(interval)));

        let handle = std::thread::spawn(move || {
            info!(interval_secs = interval.as_secs(), "snapshot schedule started");
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        fire(&engine, &retention, max_snapshots);
                        set_next_fire(&next_fire_at, Some(after(interval)));
                    }
                    // Stop requested, or the scheduler itself was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("snapshot schedule stopped");
        });

        *worker = Some(Worker {
            tx,
            handle,
            interval,
        });
        StartOutcome::Started
    }

    /// Stop the schedule
    ///
    /// Cancels the pending wait and joins the worker; a fire already in
    /// progress finishes first.
    pub fn stop(&self) -> StopOutcome {
        let worker = {
            let mut slot = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };

        match worker {
            Some(Worker { tx, handle, .. }) => {
                let _ = tx.send(());
                if handle.join().is_err() {
                    error!("snapshot schedule worker panicked");
                }
                set_next_fire(&self.next_fire_at, None);
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        }
    }

    /// Whether the schedule is currently running
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current schedule state
    pub fn status(&self) -> ScheduleStatus {
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        ScheduleStatus {
            running: worker.is_some(),
            interval: worker.as_ref().map(|w| w.interval),
            next_fire_at: *self
                .next_fire_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// One scheduled fire: snapshot, then cleanup
///
/// Failures are logged and the schedule continues; the worker never dies from
/// a failed fire.
fn fire(engine: &SnapshotEngine, retention: &RetentionManager, max_snapshots: u32) {
    debug!("scheduled snapshot firing");
    match engine.create() {
        Ok(snap) => {
            info!(id = %snap.id, "scheduled snapshot created");
            match retention.cleanup(max_snapshots) {
                Ok(evicted) if evicted > 0 => {
                    info!(evicted, "scheduled cleanup evicted snapshots");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "scheduled cleanup failed"),
            }
        }
        Err(e) => error!(error = %e, "scheduled snapshot failed; schedule continues"),
    }
}

fn after(interval: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero())
}

fn set_next_fire(slot: &Mutex<Option<DateTime<Utc>>>, value: Option<DateTime<Utc>>) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = value;
}
