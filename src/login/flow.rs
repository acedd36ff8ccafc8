//! Host side of the login: spawn the window, wait for cookies with a bound.

use std::{
    env,
    io::{BufRead, BufReader},
    process::{Child, Command, Stdio},
    thread,
    time::Duration,
};

use crossbeam_channel::{after, select, Receiver};

use super::window::COOKIE_LINE_PREFIX;
use super::LoginError;
use crate::config::Credential;
use crate::cookie::CookieJar;

/// Subcommand that makes the binary host the login window.
pub const LOGIN_WINDOW_SUBCOMMAND: &str = "login-window";

pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Waits for a cookie string carrying both session cookies.
///
/// Strings missing either cookie are skipped. Returns `WindowClosed` once the
/// source disconnects, `Cancelled` when `cancel` fires or its sender is
/// dropped, and `TimedOut` after `timeout`.
pub fn wait_for_credential(
    cookies: &Receiver<String>,
    timeout: Duration,
    cancel: &Receiver<()>,
) -> Result<Credential, LoginError> {
    let deadline = after(timeout);

    loop {
        select! {
            recv(cookies) -> raw => match raw {
                Ok(raw) => match CookieJar::parse(&raw).credential() {
                    Some(credential) => return Ok(credential),
                    None => tracing::debug!("Cookie string lacks session cookies, waiting"),
                },
                Err(_) => return Err(LoginError::WindowClosed),
            },
            recv(cancel) -> _ => return Err(LoginError::Cancelled),
            recv(deadline) -> _ => return Err(LoginError::TimedOut),
        }
    }
}

/// A running login window and the cookie strings it reports.
pub struct LoginWindow {
    child: Option<Child>,
    cookies: Receiver<String>,
}

impl LoginWindow {
    /// Re-launches the current executable in login-window mode.
    pub fn spawn() -> Result<Self, LoginError> {
        let mut command = Command::new(env::current_exe()?);
        command.arg(LOGIN_WINDOW_SUBCOMMAND);
        Self::spawn_command(command)
    }

    /// Runs `command` and reads prefixed cookie lines from its stdout.
    pub fn spawn_command(mut command: Command) -> Result<Self, LoginError> {
        let mut child = command.stdin(Stdio::null()).stdout(Stdio::piped()).spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LoginError::Window("login window stdout unavailable".to_string()))?;

        let (sender, cookies) = crossbeam_channel::unbounded();
        let spawned = thread::Builder::new()
            .name("login-window-reader".into())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if let Some(raw) = line.strip_prefix(COOKIE_LINE_PREFIX) {
                        if sender.send(raw.to_string()).is_err() {
                            break;
                        }
                    }
                }
            });

        if let Err(e) = spawned {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        tracing::debug!(pid = child.id(), "Login window process started");
        Ok(LoginWindow {
            child: Some(child),
            cookies,
        })
    }

    /// Wraps an in-process cookie source; nothing to tear down afterwards.
    pub fn from_receiver(cookies: Receiver<String>) -> Self {
        LoginWindow {
            child: None,
            cookies,
        }
    }

    /// Waits for the credential, then closes the window whatever the outcome.
    pub fn wait(mut self, timeout: Duration, cancel: &Receiver<()>) -> Result<Credential, LoginError> {
        let result = wait_for_credential(&self.cookies, timeout, cancel);
        self.close();
        result
    }

    fn close(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                if let Err(e) = child.kill() {
                    tracing::warn!("Failed to close login window: {}", e);
                }
            }
            let _ = child.wait();
        }
    }
}

impl Drop for LoginWindow {
    fn drop(&mut self) {
        self.close();
    }
}
