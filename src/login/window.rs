//! The embedded browser window, hosted in a `login-window` child process.
//!
//! The child writes every captured cookie string to stdout, one per line,
//! prefixed with [`COOKIE_LINE_PREFIX`], and exits once a string carrying both
//! session cookies has been written.

use std::io::{self, Write};

use tao::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    window::WindowBuilder,
};
use wry::WebViewBuilder;

use super::script::{CHECKIN_URL, COOKIE_WATCH_SCRIPT, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use super::LoginError;
use crate::cookie::CookieJar;

/// Marks stdout lines that carry a cookie string.
pub const COOKIE_LINE_PREFIX: &str = "cookies\t";

#[derive(Debug)]
enum LoginEvent {
    Captured,
}

fn report_cookies(cookies: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}{}", COOKIE_LINE_PREFIX, cookies.replace(['\r', '\n'], ""))?;
    stdout.flush()
}

/// Opens the login window and runs its event loop until the session cookies
/// are captured or the user closes the window. Never returns on success.
pub fn run_login_window() -> Result<(), LoginError> {
    let event_loop = EventLoopBuilder::<LoginEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .build(&event_loop)
        .map_err(|e| LoginError::Window(e.to_string()))?;

    let builder = WebViewBuilder::new()
        .with_url(CHECKIN_URL)
        .with_initialization_script(COOKIE_WATCH_SCRIPT)
        .with_ipc_handler(move |request| {
            let cookies = request.body();
            if CookieJar::parse(cookies).credential().is_none() {
                tracing::debug!("Cookie string without session cookies, still waiting");
                return;
            }

            match report_cookies(cookies) {
                Ok(()) => {
                    tracing::info!("Session cookies captured");
                    let _ = proxy.send_event(LoginEvent::Captured);
                }
                Err(e) => tracing::error!("Failed to hand cookies to host: {}", e),
            }
        });

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window);

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;

        let vbox = window
            .default_vbox()
            .ok_or_else(|| LoginError::Window("window has no GTK container".to_string()))?;
        builder.build_gtk(vbox)
    };

    let webview = webview.map_err(|e| LoginError::Window(e.to_string()))?;

    tracing::info!(url = CHECKIN_URL, "Login window open");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        // Window and webview live exactly as long as the loop
        let _ = (&window, &webview);

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                tracing::info!("Login window closed by user");
                *control_flow = ControlFlow::Exit;
            }
            Event::UserEvent(LoginEvent::Captured) => {
                *control_flow = ControlFlow::Exit;
            }
            _ => {}
        }
    })
}
