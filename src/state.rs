use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    NeedLogin,
    Checking,
    Done {
        at: DateTime<Local>,
    },
    LoginOpen,
    LoginOk,
    LoginFailed(String),
}

#[derive(Clone, Default)]
pub struct AppState {
    pub status: Status,
    pub last_summary: Option<String>,
}

impl AppState {
    pub fn new() -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn finish_cycle(&mut self, summary: String, at: DateTime<Local>) {
        self.status = Status::Done { at };
        self.last_summary = Some(summary);
    }

    pub fn status_text(&self) -> String {
        match &self.status {
            Status::Idle => "Status: Idle".to_string(),
            Status::NeedLogin => "Status: Need Login".to_string(),
            Status::Checking => "Status: Checking...".to_string(),
            Status::Done { at } => format!("Status: Done ({})", at.format("%H:%M")),
            Status::LoginOpen => "Status: Login Window Open...".to_string(),
            Status::LoginOk => "Status: Login OK".to_string(),
            Status::LoginFailed(reason) => format!("Status: Login Failed ({})", reason),
        }
    }

    /// Tooltip text; includes the last cycle summary when there is one.
    pub fn tooltip_text(&self) -> String {
        match &self.last_summary {
            Some(summary) => format!("HoyoDaily: {}", summary),
            None => "HoyoDaily Auto Check-in".to_string(),
        }
    }
}

/// Applies `f` to the shared state, tolerating a poisoned lock.
pub fn update(state: &Arc<RwLock<AppState>>, f: impl FnOnce(&mut AppState)) {
    match state.write() {
        Ok(mut guard) => f(&mut guard),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}
