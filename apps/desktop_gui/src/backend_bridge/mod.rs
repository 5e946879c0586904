//! Worker thread that owns the async runtime and the view-state controller.

pub mod commands;
pub mod runtime;
