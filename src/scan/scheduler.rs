// src/scan/scheduler.rs
//! Forever loop: one scan immediately, then one per interval.
//!
//! Each scan runs to completion before the timer is re-armed, so scans never
//! overlap; a scan longer than the interval only delays the next one. Shutdown
//! is observed only while idle.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::ScanReport;

#[async_trait::async_trait]
pub trait ScanJob: Send + Sync {
    async fn scan(&self) -> ScanReport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scanning,
}

pub struct Scheduler {
    interval: Duration,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self { interval, state }
    }

    pub fn from_minutes(mins: u64) -> Self {
        Self::new(Duration::from_secs(mins.max(1).saturating_mul(60)))
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Run until `shutdown` resolves. Returns the number of completed scans.
    pub async fn run<J, F>(&self, job: &J, shutdown: F) -> u64
    where
        J: ScanJob + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        tokio::pin!(shutdown);
        let mut scans = 0u64;
        loop {
            self.state.send_replace(SchedulerState::Scanning);
            let report = job.scan().await;
            scans += 1;
            self.state.send_replace(SchedulerState::Idle);
            tracing::debug!(
                scans,
                new = report.new_count(),
                next_in_secs = self.interval.as_secs(),
                "scan finished, idle"
            );

            ticker.reset();
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(scans, "scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }
        }
        scans
    }
}
