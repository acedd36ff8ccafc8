//! One check-in pass wired to the shared state: status label, claim, notify.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use chrono::Local;

use crate::{
    claim::{Claimer, CycleReport},
    config::CredentialStore,
    notify::{Notifier, REPORT_TITLE},
    state::{self, AppState, Status},
};

pub struct CheckIn {
    store: Arc<CredentialStore>,
    state: Arc<RwLock<AppState>>,
    claimer: Claimer,
    notifier: Arc<dyn Notifier>,
    running: AtomicBool,
}

impl CheckIn {
    pub fn new(
        store: Arc<CredentialStore>,
        state: Arc<RwLock<AppState>>,
        claimer: Claimer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        CheckIn {
            store,
            state,
            claimer,
            notifier,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one claim cycle.
    ///
    /// Returns `None` when another cycle is already in flight, in which case
    /// this call does nothing.
    pub fn perform(&self) -> Option<CycleReport> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::info!("Check-in already running, skipping");
            return None;
        }

        let report = self.run_cycle();
        self.running.store(false, Ordering::SeqCst);
        Some(report)
    }

    fn run_cycle(&self) -> CycleReport {
        let credential = self.store.snapshot();
        if !credential.is_logged_in() {
            state::update(&self.state, |s| s.set_status(Status::NeedLogin));
            return CycleReport::NeedLogin;
        }

        state::update(&self.state, |s| s.set_status(Status::Checking));

        let report = self.claimer.run_cycle(&credential);
        let summary = report.summary();

        state::update(&self.state, |s| s.finish_cycle(summary.clone(), Local::now()));

        if report.should_notify() {
            self.notifier.notify(REPORT_TITLE, &summary);
        }

        report
    }
}
