// Hide the console window for release builds on Windows
#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

use std::{error::Error, path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};

use hoyodaily::{
    app,
    claim::{Claimer, CycleReport},
    config::{default_config_path, CredentialStore},
    logging,
    login::{self, Login, ProcessLauncher},
    notify::{DesktopNotifier, Notifier, RecordingNotifier, REPORT_TITLE},
    scheduler::ScheduleConfig,
    state::AppState,
};

/// Release builds carry the tag version; local builds fall back to Cargo's.
const VERSION: &str = match option_env!("HOYODAILY_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Parser)]
#[command(name = "hoyodaily", version = VERSION, about = "HoYoLAB daily check-in helper")]
struct Cli {
    /// Path to the credential file (defaults to the per-user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Claim today's rewards once, print the summary and exit
    CheckIn {
        /// Do not show a desktop notification
        #[arg(long)]
        no_notify: bool,
    },
    /// Open the login window and store the captured session
    Login {
        /// Give up after this many seconds
        #[arg(long, default_value_t = login::DEFAULT_LOGIN_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Host the embedded login window (spawned by the app itself)
    #[command(name = "login-window", hide = true)]
    LoginWindow,
}

fn open_store(path: Option<PathBuf>) -> Result<Arc<CredentialStore>, Box<dyn Error>> {
    let path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };
    Ok(Arc::new(CredentialStore::open(path)))
}

fn check_in_once(store: Arc<CredentialStore>, notify: bool) -> Result<(), Box<dyn Error>> {
    let report = Claimer::new().run_cycle(&store.snapshot());
    if report == CycleReport::NeedLogin {
        return Err("not logged in; run `hoyodaily login` first".into());
    }

    let summary = report.summary();
    println!("{}", summary);

    if notify && report.should_notify() {
        DesktopNotifier.notify(REPORT_TITLE, &summary);
    }
    Ok(())
}

fn login_once(store: Arc<CredentialStore>, timeout: Duration) -> Result<(), Box<dyn Error>> {
    let login = Login::with_launcher(
        Arc::clone(&store),
        AppState::new(),
        Arc::new(RecordingNotifier::new()),
        Box::new(ProcessLauncher),
        timeout,
    );
    let credential = login.perform()?;
    println!(
        "Logged in as {}; session saved to {}",
        credential.ltuid,
        store.path().display()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_prefix = match cli.command {
        Some(Command::LoginWindow) => "login-window",
        _ => "hoyodaily",
    };
    let _log_guard = logging::init(log_prefix);

    match cli.command {
        Some(Command::LoginWindow) => {
            login::run_login_window()?;
            Ok(())
        }
        Some(Command::CheckIn { no_notify }) => check_in_once(open_store(cli.config)?, !no_notify),
        Some(Command::Login { timeout_secs }) => {
            login_once(open_store(cli.config)?, Duration::from_secs(timeout_secs))
        }
        None => {
            tracing::info!(version = VERSION, "HoyoDaily starting");
            let store = open_store(cli.config)?;
            app::run(store, Arc::new(DesktopNotifier), ScheduleConfig::default())
        }
    }
}
