//! Interactive login through an embedded browser window.
//!
//! The window loads the HoYoLAB check-in page with a script that watches the
//! cookie jar. Once the user has logged in, the session cookies are relayed
//! back, stored in the [`CredentialStore`] and the window is closed.

mod flow;
mod script;
mod window;

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
    time::Duration,
};

use crossbeam_channel::Sender;
use thiserror::Error;

pub use flow::{wait_for_credential, LoginWindow, DEFAULT_LOGIN_TIMEOUT, LOGIN_WINDOW_SUBCOMMAND};
pub use script::{CHECKIN_URL, COOKIE_WATCH_SCRIPT};
pub use window::{run_login_window, COOKIE_LINE_PREFIX};

use crate::{
    config::{Credential, CredentialStore},
    notify::Notifier,
    state::{self, AppState, Status},
};

pub const LOGIN_OK_TITLE: &str = "Login Successful";
pub const LOGIN_OK_BODY: &str = "Session cookies captured!";

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("failed to start login window: {0}")]
    Spawn(#[from] io::Error),
    #[error("login timed out")]
    TimedOut,
    #[error("login cancelled")]
    Cancelled,
    #[error("login window closed before login completed")]
    WindowClosed,
    #[error("login already in progress")]
    AlreadyInProgress,
    #[error("login window error: {0}")]
    Window(String),
}

impl LoginError {
    /// Short form for the tray status label.
    pub fn short_reason(&self) -> &'static str {
        match self {
            LoginError::TimedOut => "timed out",
            LoginError::Cancelled => "cancelled",
            LoginError::WindowClosed => "window closed",
            LoginError::AlreadyInProgress => "already open",
            LoginError::Spawn(_) | LoginError::Window(_) => "window error",
        }
    }
}

/// Opens a login window. Swapped out in tests.
pub trait WindowLauncher: Send + Sync {
    fn launch(&self) -> Result<LoginWindow, LoginError>;
}

/// Launches the window as a child process of the running executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl WindowLauncher for ProcessLauncher {
    fn launch(&self) -> Result<LoginWindow, LoginError> {
        LoginWindow::spawn()
    }
}

pub struct Login {
    store: Arc<CredentialStore>,
    state: Arc<RwLock<AppState>>,
    notifier: Arc<dyn Notifier>,
    launcher: Box<dyn WindowLauncher>,
    timeout: Duration,
    in_flight: Mutex<Option<Sender<()>>>,
    closed: AtomicBool,
}

impl Login {
    pub fn new(
        store: Arc<CredentialStore>,
        state: Arc<RwLock<AppState>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_launcher(store, state, notifier, Box::new(ProcessLauncher), DEFAULT_LOGIN_TIMEOUT)
    }

    pub fn with_launcher(
        store: Arc<CredentialStore>,
        state: Arc<RwLock<AppState>>,
        notifier: Arc<dyn Notifier>,
        launcher: Box<dyn WindowLauncher>,
        timeout: Duration,
    ) -> Self {
        Login {
            store,
            state,
            notifier,
            launcher,
            timeout,
            in_flight: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_flight.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Closes the open login window, if any.
    pub fn cancel(&self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(cancel) = in_flight.take() {
                tracing::info!("Cancelling login");
                let _ = cancel.try_send(());
            }
        }
    }

    /// Cancels the open login window and refuses any later request.
    ///
    /// Holds the in-flight lock while flagging, so a login that has not yet
    /// registered either sees the flag or is already cancellable.
    pub fn close(&self) {
        match self.in_flight.lock() {
            Ok(mut in_flight) => {
                self.closed.store(true, Ordering::SeqCst);
                if let Some(cancel) = in_flight.take() {
                    tracing::info!("Cancelling login");
                    let _ = cancel.try_send(());
                }
            }
            Err(_) => self.closed.store(true, Ordering::SeqCst),
        }
    }

    /// Runs the whole login: open the window, wait for the session cookies,
    /// persist them. Blocks until done; call from a background thread.
    pub fn perform(&self) -> Result<Credential, LoginError> {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .map_err(|_| LoginError::Window("login state poisoned".to_string()))?;
            if self.closed.load(Ordering::SeqCst) {
                return Err(LoginError::Cancelled);
            }
            if in_flight.is_some() {
                tracing::info!("Login window already open, ignoring request");
                return Err(LoginError::AlreadyInProgress);
            }
            *in_flight = Some(cancel_tx.clone());
        }

        state::update(&self.state, |s| s.set_status(Status::LoginOpen));

        let result = self
            .launcher
            .launch()
            .and_then(|window| window.wait(self.timeout, &cancel_rx));

        if let Ok(mut in_flight) = self.in_flight.lock() {
            // A cancelled login may already have been replaced by a new one
            if in_flight.as_ref().is_some_and(|s| s.same_channel(&cancel_tx)) {
                *in_flight = None;
            }
        }

        match result {
            Ok(credential) => {
                if let Err(e) = self.store.replace(credential.clone()) {
                    tracing::error!("Failed to save credential: {}", e);
                }
                self.notifier.notify(LOGIN_OK_TITLE, LOGIN_OK_BODY);
                state::update(&self.state, |s| s.set_status(Status::LoginOk));
                tracing::info!("Login completed");
                Ok(credential)
            }
            Err(e) => {
                tracing::warn!("Login did not complete: {}", e);
                let reason = e.short_reason().to_string();
                state::update(&self.state, |s| s.set_status(Status::LoginFailed(reason)));
                Err(e)
            }
        }
    }
}
