//! Linux tray implementation using ksni (KDE StatusNotifierItem).
//!
//! Works with KDE Plasma and other desktop environments that implement the
//! freedesktop StatusNotifierItem specification.

use crossbeam_channel::{Receiver, Sender};
use ksni::blocking::TrayMethods;
use ksni::menu::*;
use std::sync::{Arc, RwLock};

use crate::icon;
use crate::state::AppState;
use crate::tray_common::{
    TrayCommand, CHECK_IN_LABEL, EXIT_LABEL, LOGIN_LABEL, TITLE, TOOLTIP_DEFAULT,
};

struct TrayState {
    status_text: String,
    tooltip: String,
    command_sender: Sender<TrayCommand>,
}

struct HoyoTray {
    state: Arc<RwLock<TrayState>>,
    icon: Vec<ksni::Icon>,
}

impl HoyoTray {
    fn send(&self, command: TrayCommand) {
        if let Ok(state) = self.state.read() {
            let _ = state.command_sender.send(command);
        }
    }
}

fn load_icon() -> Vec<ksni::Icon> {
    match icon::themed_icon() {
        Ok(image) => {
            let (width, height) = image.dimensions();
            vec![ksni::Icon {
                width: width as i32,
                height: height as i32,
                data: icon::to_argb(&image),
            }]
        }
        Err(e) => {
            tracing::warn!("Failed to decode tray icon: {}", e);
            vec![]
        }
    }
}

impl ksni::Tray for HoyoTray {
    // Left-click opens the menu too
    const MENU_ON_ACTIVATE: bool = true;

    fn id(&self) -> String {
        "hoyodaily".into()
    }

    fn icon_name(&self) -> String {
        "hoyodaily".into()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        self.icon.clone()
    }

    fn title(&self) -> String {
        TITLE.into()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        let description = self
            .state
            .read()
            .map(|s| s.tooltip.clone())
            .unwrap_or_else(|_| TOOLTIP_DEFAULT.into());

        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: vec![],
            title: TITLE.into(),
            description,
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let status_text = self
            .state
            .read()
            .map(|s| s.status_text.clone())
            .unwrap_or_else(|_| "Status: Idle".into());

        vec![
            StandardItem {
                label: status_text,
                enabled: false,
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: CHECK_IN_LABEL.into(),
                activate: Box::new(|tray: &mut Self| tray.send(TrayCommand::CheckIn)),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: LOGIN_LABEL.into(),
                activate: Box::new(|tray: &mut Self| tray.send(TrayCommand::Login)),
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: EXIT_LABEL.into(),
                activate: Box::new(|tray: &mut Self| tray.send(TrayCommand::Quit)),
                ..Default::default()
            }
            .into(),
        ]
    }
}

/// Handle to the tray icon, allowing updates from the main thread.
pub struct Tray {
    handle: ksni::blocking::Handle<HoyoTray>,
    tray_state: Arc<RwLock<TrayState>>,
    command_receiver: Receiver<TrayCommand>,
    last_status: String,
}

impl Tray {
    /// Creates the tray icon; ksni runs the D-Bus side on its own thread.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (command_sender, command_receiver) = crossbeam_channel::unbounded();

        let tray_state = Arc::new(RwLock::new(TrayState {
            status_text: "Status: Idle".into(),
            tooltip: TOOLTIP_DEFAULT.into(),
            command_sender,
        }));

        let tray = HoyoTray {
            state: Arc::clone(&tray_state),
            icon: load_icon(),
        };

        let handle = tray.spawn().map_err(|e| {
            tracing::error!("Failed to spawn ksni tray: {}", e);
            Box::new(std::io::Error::other(format!("ksni spawn failed: {}", e)))
                as Box<dyn std::error::Error>
        })?;

        tracing::info!("System tray initialized (ksni/StatusNotifierItem)");

        Ok(Tray {
            handle,
            tray_state,
            command_receiver,
            last_status: String::new(),
        })
    }

    /// Refreshes the status label and tooltip when the app state changed.
    pub fn update_status(&mut self, state: &Arc<RwLock<AppState>>) {
        if let Ok(app_state) = state.read() {
            let status = app_state.status_text();
            if status != self.last_status {
                if let Ok(mut tray_state) = self.tray_state.write() {
                    tray_state.status_text = status.clone();
                    tray_state.tooltip = app_state.tooltip_text();
                }

                self.handle.update(|_| {});
                self.last_status = status;
            }
        }
    }

    /// Returns the next menu command, if one is pending.
    pub fn poll_events(&mut self) -> Option<TrayCommand> {
        self.command_receiver.try_recv().ok()
    }

    /// Blocks until a menu command arrives or `timeout` elapses.
    pub fn wait_event(&mut self, timeout: std::time::Duration) -> Option<TrayCommand> {
        self.command_receiver.recv_timeout(timeout).ok()
    }
}
