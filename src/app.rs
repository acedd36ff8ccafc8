//! Tray application: wires the scheduler, check-in and login to the menu.

use std::{
    error::Error,
    sync::{Arc, RwLock},
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    checkin::CheckIn,
    claim::Claimer,
    config::CredentialStore,
    login::Login,
    notify::Notifier,
    scheduler::{ScheduleConfig, Scheduler},
    state::{self, AppState, Status},
    tray::Tray,
    tray_common::TrayCommand,
};

/// How often the tray loop refreshes the status label.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct App {
    pub state: Arc<RwLock<AppState>>,
    checkin: Arc<CheckIn>,
    login: Arc<Login>,
    login_task: Option<JoinHandle<()>>,
    scheduler: Option<Scheduler>,
}

impl App {
    pub fn new(store: Arc<CredentialStore>, notifier: Arc<dyn Notifier>) -> Self {
        let state = AppState::new();
        let checkin = CheckIn::new(
            Arc::clone(&store),
            Arc::clone(&state),
            Claimer::new(),
            Arc::clone(&notifier),
        );
        let login = Login::new(store, Arc::clone(&state), notifier);
        Self::from_parts(state, checkin, login)
    }

    pub fn from_parts(state: Arc<RwLock<AppState>>, checkin: CheckIn, login: Login) -> Self {
        App {
            state,
            checkin: Arc::new(checkin),
            login: Arc::new(login),
            login_task: None,
            scheduler: None,
        }
    }

    pub fn start_scheduler(&mut self, config: ScheduleConfig) -> std::io::Result<()> {
        let checkin = Arc::clone(&self.checkin);
        self.scheduler = Some(Scheduler::start(config, move || {
            checkin.perform();
        })?);
        Ok(())
    }

    /// Dispatches a menu command. Check-in and login run on their own threads.
    pub fn handle_command(&mut self, command: TrayCommand) -> Flow {
        match command {
            TrayCommand::CheckIn => {
                tracing::info!("Manual check-in requested from tray menu");
                let checkin = Arc::clone(&self.checkin);
                spawn_task("manual-check-in", move || {
                    checkin.perform();
                });
                Flow::Continue
            }
            TrayCommand::Login => {
                let running = self.login_task.as_ref().is_some_and(|t| !t.is_finished());
                if running || self.login.is_in_progress() {
                    tracing::info!("Login window already open");
                    return Flow::Continue;
                }
                tracing::info!("Login requested from tray menu");
                let login = Arc::clone(&self.login);
                self.login_task = spawn_task("login", move || {
                    let _ = login.perform();
                });
                Flow::Continue
            }
            TrayCommand::Quit => {
                tracing::info!("Quit requested from tray menu");
                Flow::Exit
            }
        }
    }

    /// Closes any open login window and stops the scheduler.
    ///
    /// Returns once the login thread has torn its window down.
    pub fn shutdown(&mut self) {
        self.login.close();
        if let Some(task) = self.login_task.take() {
            if task.join().is_err() {
                tracing::error!("Login thread panicked");
            }
        }
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
    }

    fn set_initial_status(&self, logged_in: bool) {
        if !logged_in {
            state::update(&self.state, |s| s.set_status(Status::NeedLogin));
        }
    }
}

fn spawn_task(name: &str, task: impl FnOnce() + Send + 'static) -> Option<JoinHandle<()>> {
    match thread::Builder::new().name(name.into()).spawn(task) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!("Failed to spawn {} thread: {}", name, e);
            None
        }
    }
}

/// Starts the scheduler and runs the tray until Exit is chosen.
pub fn run(
    store: Arc<CredentialStore>,
    notifier: Arc<dyn Notifier>,
    schedule: ScheduleConfig,
) -> Result<(), Box<dyn Error>> {
    let logged_in = store.is_logged_in();
    let mut app = App::new(store, notifier);
    app.set_initial_status(logged_in);
    app.start_scheduler(schedule)?;

    let result = run_tray(&mut app);
    app.shutdown();
    tracing::info!("HoyoDaily stopped");
    result
}

#[cfg(target_os = "linux")]
fn run_tray(app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut tray = Tray::new()?;

    loop {
        tray.update_status(&app.state);
        if let Some(command) = tray.wait_event(POLL_INTERVAL) {
            if app.handle_command(command) == Flow::Exit {
                return Ok(());
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn run_tray(app: &mut App) -> Result<(), Box<dyn Error>> {
    use std::time::Instant;
    use winit::{
        application::ApplicationHandler,
        event::{StartCause, WindowEvent},
        event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
        window::WindowId,
    };

    struct TrayLoop<'a> {
        app: &'a mut App,
        tray: Option<Tray>,
        error: Option<Box<dyn Error>>,
    }

    impl ApplicationHandler for TrayLoop<'_> {
        fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
            // The tray must be created once the loop is running (macOS)
            if matches!(cause, StartCause::Init) {
                match Tray::new() {
                    Ok(tray) => self.tray = Some(tray),
                    Err(e) => {
                        self.error = Some(e);
                        event_loop.exit();
                    }
                }
            }
        }

        fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

        fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}

        fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
            if let Some(tray) = self.tray.as_mut() {
                tray.update_status(&self.app.state);
                while let Some(command) = tray.poll_events() {
                    if self.app.handle_command(command) == Flow::Exit {
                        event_loop.exit();
                        return;
                    }
                }
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
        }
    }

    let event_loop = EventLoop::new()?;
    let mut tray_loop = TrayLoop {
        app,
        tray: None,
        error: None,
    };
    event_loop.run_app(&mut tray_loop)?;

    match tray_loop.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::{LoginError, LoginWindow, WindowLauncher};
    use crate::notify::RecordingNotifier;

    struct NoWindow;

    impl WindowLauncher for NoWindow {
        fn launch(&self) -> Result<LoginWindow, LoginError> {
            Err(LoginError::Window("no display".to_string()))
        }
    }

    /// Starts a long-running `sh` child that records its pid in `pid_file`.
    #[cfg(unix)]
    struct SleepWindow {
        pid_file: std::path::PathBuf,
    }

    #[cfg(unix)]
    impl WindowLauncher for SleepWindow {
        fn launch(&self) -> Result<LoginWindow, LoginError> {
            let mut command = std::process::Command::new("sh");
            command
                .arg("-c")
                .arg("echo $$ > \"$1\"; exec sleep 30")
                .arg("sh")
                .arg(&self.pid_file);
            LoginWindow::spawn_command(command)
        }
    }

    fn test_app() -> App {
        test_app_with(Box::new(NoWindow))
    }

    fn test_app_with(launcher: Box<dyn WindowLauncher>) -> App {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CredentialStore::new(dir.path().join("config.json")));
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::new());
        let state = AppState::new();
        let checkin = CheckIn::new(
            Arc::clone(&store),
            Arc::clone(&state),
            Claimer::new(),
            Arc::clone(&notifier),
        );
        let login = Login::with_launcher(
            store,
            Arc::clone(&state),
            notifier,
            launcher,
            Duration::from_secs(60),
        );
        App::from_parts(state, checkin, login)
    }

    #[test]
    fn test_quit_exits() {
        let mut app = test_app();
        assert_eq!(app.handle_command(TrayCommand::Quit), Flow::Exit);
    }

    #[test]
    fn test_manual_check_in_without_login_reports_need_login() {
        let mut app = test_app();
        assert_eq!(app.handle_command(TrayCommand::CheckIn), Flow::Continue);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let status = app.state.read().unwrap().status.clone();
            if status == Status::NeedLogin {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "status never updated");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_initial_status() {
        let app = test_app();
        app.set_initial_status(false);
        assert_eq!(app.state.read().unwrap().status_text(), "Status: Need Login");
    }

    #[cfg(unix)]
    #[test]
    fn test_shutdown_kills_open_login_window() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let mut app = test_app_with(Box::new(SleepWindow {
            pid_file: pid_file.clone(),
        }));

        assert_eq!(app.handle_command(TrayCommand::Login), Flow::Continue);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let pid = loop {
            let pid = std::fs::read_to_string(&pid_file).unwrap_or_default();
            if !pid.trim().is_empty() {
                break pid.trim().to_string();
            }
            assert!(std::time::Instant::now() < deadline, "login window never started");
            thread::sleep(Duration::from_millis(10));
        };

        app.shutdown();

        let alive = std::process::Command::new("kill")
            .arg("-0")
            .arg(&pid)
            .status()
            .unwrap()
            .success();
        assert!(!alive, "login window process {} survived shutdown", pid);
        assert!(!app.login.is_in_progress());
    }

    #[test]
    fn test_shutdown_before_login_starts_does_not_hang() {
        let mut app = test_app();
        app.handle_command(TrayCommand::Login);
        app.shutdown();
        assert!(app.login_task.is_none());
    }
}
