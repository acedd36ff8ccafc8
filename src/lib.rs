pub mod app;
pub mod checkin;
pub mod claim;
pub mod config;
pub mod cookie;
pub mod icon;
pub mod logging;
pub mod login;
pub mod notify;
pub mod scheduler;
pub mod state;
pub mod tray_common;

// Platform-specific tray implementations:
// - Linux: ksni (KDE StatusNotifierItem) for native KDE/freedesktop support
// - Windows/macOS: tray-icon crate
#[cfg(target_os = "linux")]
#[path = "tray_linux.rs"]
pub mod tray;

#[cfg(not(target_os = "linux"))]
pub mod tray;
