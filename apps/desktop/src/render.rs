//! Line-oriented rendering of controller snapshots.

use std::sync::Mutex;

use client_core::{
    presentation::file_size_text, state::PreviewState, Renderer, ViewSnapshot,
};
use shared::domain::{SidePanel, ViewState};

/// Prints a frame whenever its text differs from the last one printed.
/// Progress percentages are logged rather than printed so ticks inside one
/// phase do not repeat the same lines.
#[derive(Default)]
pub struct TerminalRenderer {
    last: Mutex<Vec<String>>,
}

impl Renderer for TerminalRenderer {
    fn render(&self, snapshot: &ViewSnapshot) {
        if snapshot.view == ViewState::Loading {
            tracing::debug!(percent = snapshot.progress.percent(), "progress");
        }
        let lines = describe(snapshot);
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if *last == lines {
            return;
        }
        for line in &lines {
            println!("{line}");
        }
        *last = lines;
    }
}

pub fn describe(snapshot: &ViewSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    if snapshot.side_panel == SidePanel::Preview {
        if let Some(image) = &snapshot.selected {
            lines.push(format!(
                "Selected {} ({}, {})",
                image.filename(),
                image.media_type(),
                file_size_text(image.size_bytes())
            ));
        }
        match &snapshot.preview {
            PreviewState::Ready(preview) => {
                lines.push(format!("Preview {}x{}", preview.width, preview.height))
            }
            PreviewState::Failed(reason) => lines.push(format!("Preview unavailable: {reason}")),
            PreviewState::Empty | PreviewState::Pending => {}
        }
    }

    match snapshot.view {
        ViewState::Welcome => {
            if snapshot.side_panel == SidePanel::Upload {
                lines.push("Open a PNG, JPG, JPEG, GIF or BMP leaf image to begin.".into());
            }
        }
        ViewState::Loading => {
            lines.push(format!("Analyzing... {}", snapshot.progress.phase().label()));
        }
        ViewState::Results => {
            if let Some(result) = &snapshot.result {
                lines.push(format!(
                    "{} {}",
                    result.icon.glyph.symbol(),
                    result.disease_name
                ));
                lines.push(format!("Confidence: {}", result.confidence_text));
                lines.push(format!("Severity: {}", result.severity_text));
                lines.push(format!(
                    "[{}] {}",
                    snapshot.active_tab.title(),
                    result.detail(snapshot.active_tab)
                ));
            }
        }
        ViewState::Error => {
            if let Some(message) = &snapshot.error_message {
                lines.push(format!("Error: {message}"));
            }
        }
    }

    lines
}
