//! Runner - background update loop
//!
//! Moves a `DashboardCore` onto its own thread and drives one cycle per
//! tick. Producers keep feeding it through `IngressHandle`s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::dashboard::{CycleOutcome, DashboardCore, Snapshot};
use super::ingress::IngressHandle;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to spawn update thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("update thread panicked")]
    Panicked,
}

/// Spawns the update loop
pub struct Runner;

impl Runner {
    /// Start the loop. `tick` bounds how long a cycle waits for data.
    pub fn spawn(core: DashboardCore, tick: Duration) -> Result<RunnerHandle, RunnerError> {
        let stop = Arc::new(AtomicBool::new(false));
        let ingress = core.ingress_handle();
        let latest = Arc::new(parking_lot::RwLock::new(core.snapshot()));

        let thread = {
            let stop = Arc::clone(&stop);
            let latest = Arc::clone(&latest);
            thread::Builder::new()
                .name("dashboard-core".to_string())
                .spawn(move || run_loop(core, tick, &stop, &latest))?
        };

        Ok(RunnerHandle {
            stop,
            ingress,
            latest,
            thread,
        })
    }
}

fn run_loop(
    mut core: DashboardCore,
    tick: Duration,
    stop: &AtomicBool,
    latest: &parking_lot::RwLock<Arc<Snapshot>>,
) -> DashboardCore {
    log::info!("Update loop started (tick: {} ms)", tick.as_millis());

    while !stop.load(Ordering::Acquire) {
        if let CycleOutcome::Updated(snapshot) = core.wait_and_run_cycle(tick) {
            *latest.write() = snapshot;
        }
    }

    // Flush anything enqueued before the stop request.
    if let CycleOutcome::Updated(snapshot) = core.run_cycle() {
        *latest.write() = snapshot;
    }

    log::info!("Update loop stopped after {} cycles", core.stats().cycles);
    core
}

/// Owner side of a running loop
pub struct RunnerHandle {
    stop: Arc<AtomicBool>,
    ingress: IngressHandle,
    latest: Arc<parking_lot::RwLock<Arc<Snapshot>>>,
    thread: JoinHandle<DashboardCore>,
}

impl RunnerHandle {
    pub fn ingress_handle(&self) -> IngressHandle {
        self.ingress.clone()
    }

    /// Most recent snapshot built by the loop
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.latest.read().clone()
    }

    /// Stop the loop, wait for the thread and hand the core back.
    /// Returns within roughly one tick.
    pub fn stop(self) -> Result<DashboardCore, RunnerError> {
        self.stop.store(true, Ordering::Release);
        self.thread.join().map_err(|_| RunnerError::Panicked)
    }
}
