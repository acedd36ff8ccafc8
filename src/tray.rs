//! System tray implementation using tray-icon (Windows/macOS).
//!
//! This module is only compiled on non-Linux platforms.
//! Linux uses the ksni-based implementation in tray_linux.rs.

use crossbeam_channel::Receiver;
use std::sync::{Arc, RwLock};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    Icon, TrayIcon, TrayIconBuilder,
};

use crate::icon;
use crate::state::AppState;
use crate::tray_common::{
    TrayCommand, CHECK_IN_LABEL, EXIT_LABEL, LOGIN_LABEL, TOOLTIP_DEFAULT,
};

pub struct Tray {
    tray_icon: TrayIcon,
    menu_receiver: Receiver<MenuEvent>,
    check_in_item_id: MenuId,
    login_item_id: MenuId,
    exit_item_id: MenuId,
    status_item: MenuItem,
    last_status: String,
}

impl Tray {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let icon = Self::load_icon()?;

        // Status display (disabled, just for showing info)
        let status_item = MenuItem::new("Status: Idle", false, None);
        let check_in_item = MenuItem::new(CHECK_IN_LABEL, true, None);
        let login_item = MenuItem::new(LOGIN_LABEL, true, None);
        let exit_item = MenuItem::new(EXIT_LABEL, true, None);

        let check_in_item_id = check_in_item.id().clone();
        let login_item_id = login_item.id().clone();
        let exit_item_id = exit_item.id().clone();

        let menu = Menu::new();
        menu.append(&status_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&check_in_item)?;
        menu.append(&login_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&exit_item)?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(TOOLTIP_DEFAULT)
            .with_icon(icon)
            .build()?;

        let menu_receiver = MenuEvent::receiver().clone();

        tracing::info!("System tray initialized");

        Ok(Tray {
            tray_icon,
            menu_receiver,
            check_in_item_id,
            login_item_id,
            exit_item_id,
            status_item,
            last_status: String::new(),
        })
    }

    fn load_icon() -> Result<Icon, Box<dyn std::error::Error>> {
        let image = icon::themed_icon()?;
        let (width, height) = image.dimensions();
        Icon::from_rgba(image.into_raw(), width, height).map_err(|e| e.into())
    }

    /// Refreshes the status label and tooltip when the app state changed.
    pub fn update_status(&mut self, state: &Arc<RwLock<AppState>>) {
        if let Ok(state) = state.read() {
            let status = state.status_text();
            if status != self.last_status {
                self.status_item.set_text(&status);
                let _ = self.tray_icon.set_tooltip(Some(state.tooltip_text()));
                self.last_status = status;
            }
        }
    }

    /// Returns the next menu command, if one is pending.
    pub fn poll_events(&mut self) -> Option<TrayCommand> {
        let event = self.menu_receiver.try_recv().ok()?;
        if event.id == self.exit_item_id {
            Some(TrayCommand::Quit)
        } else if event.id == self.check_in_item_id {
            Some(TrayCommand::CheckIn)
        } else if event.id == self.login_item_id {
            Some(TrayCommand::Login)
        } else {
            None
        }
    }
}
