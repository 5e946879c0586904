//! UI layer for desktop GUI: app shell, panels, widgets, and colors.

pub mod app;
pub mod panels;
pub mod theme;
pub mod widgets;

pub use app::{LeafscanApp, PersistedGuiSettings, SETTINGS_STORAGE_KEY};
