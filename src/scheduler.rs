//! Fixed-interval check-in scheduling.
//!
//! One cycle runs after a short startup delay, then one per period, until the
//! scheduler is stopped. There is no drift correction and no catch-up: a tick
//! that elapses while a cycle is still running is coalesced into the next one.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{after, select, tick, Receiver, Sender};

pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub startup_delay: Duration,
    pub period: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            startup_delay: DEFAULT_STARTUP_DELAY,
            period: DEFAULT_PERIOD,
        }
    }
}

/// Handle to a running scheduler thread.
pub struct Scheduler {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns the scheduler thread; `job` runs once per cycle on that thread.
    pub fn start<F>(config: ScheduleConfig, job: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown, shutdown_rx) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("scheduler".into())
            .spawn(move || run(config, shutdown_rx, job))?;

        tracing::info!(
            startup_delay_secs = config.startup_delay.as_secs(),
            period_secs = config.period.as_secs(),
            "Scheduler started"
        );

        Ok(Scheduler {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Stops the loop and waits for an in-flight cycle to finish.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Scheduler thread panicked");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

/// The scheduler loop. Returns when `shutdown` receives a message or its
/// sender is dropped.
pub fn run<F>(config: ScheduleConfig, shutdown: Receiver<()>, mut job: F)
where
    F: FnMut(),
{
    select! {
        recv(after(config.startup_delay)) -> _ => {}
        recv(shutdown) -> _ => {
            tracing::debug!("Scheduler stopped before first cycle");
            return;
        }
    }

    tracing::debug!("Running initial check-in");
    job();

    let ticker = tick(config.period);
    loop {
        select! {
            recv(ticker) -> _ => {
                tracing::debug!("Running scheduled check-in");
                job();
            }
            recv(shutdown) -> _ => break,
        }
    }

    tracing::debug!("Scheduler stopped");
}
