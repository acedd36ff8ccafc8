//! Menu labels and commands shared by both tray backends.

pub const TITLE: &str = "HoyoDaily";
pub const TOOLTIP_DEFAULT: &str = "HoyoDaily Auto Check-in";

pub const CHECK_IN_LABEL: &str = "Check-in Now";
pub const LOGIN_LABEL: &str = "Login / Setup";
pub const EXIT_LABEL: &str = "Exit";

/// Commands that can be triggered from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    CheckIn,
    Login,
    Quit,
}
