//! UI/backend events and error modeling for desktop GUI controller.

use client_core::ViewSnapshot;

pub enum UiEvent {
    Render(Box<ViewSnapshot>),
    Info(String),
    /// Analysis finished with a result.
    AnalysisComplete(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Io,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    SelectFile,
    Analyze,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("valid image file")
            || message_lower.contains("file size must be")
            || message_lower.contains("unknown detail tab")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("no such file")
            || message_lower.contains("permission denied")
            || message_lower.contains("could not read")
        {
            UiErrorCategory::Io
        } else if message_lower.contains("network")
            || message_lower.contains("connection")
            || message_lower.contains("timed out")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
