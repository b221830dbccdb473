//! System tray: icon, menu, and the loop that drives them

pub mod host;
pub mod icon;
pub mod manager;
pub mod menu;

pub use host::{LocalTray, TrayOptions};
pub use manager::TrayControl;
