//! Small reusable widgets.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::ui::theme;

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    shown_at: Instant,
}

/// Stack of transient notifications in the top-right corner.
#[derive(Debug)]
pub struct Toasts {
    items: Vec<Toast>,
    ttl: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(TOAST_TTL)
    }
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.push_at(kind, message, Instant::now());
    }

    pub fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        self.items.push(Toast {
            kind,
            message: message.into(),
            shown_at: now,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < ttl);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.prune(Instant::now());
        if self.items.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("leafscan_toasts"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-20.0, 20.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(300.0);
                for toast in &self.items {
                    let fill = match toast.kind {
                        ToastKind::Success => theme::ACCENT,
                        ToastKind::Warning => theme::WARNING,
                    };
                    egui::Frame::NONE
                        .fill(fill)
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(16, 12))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&toast.message).color(egui::Color32::WHITE));
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let start = Instant::now();
        let mut toasts = Toasts::new(Duration::from_secs(5));
        toasts.push_at(ToastKind::Success, "Analysis complete", start);
        toasts.push_at(ToastKind::Warning, "Network error", start + Duration::from_secs(3));

        toasts.prune(start + Duration::from_millis(4_999));
        assert_eq!(toasts.items.len(), 2);

        toasts.prune(start + Duration::from_secs(5));
        assert_eq!(toasts.items.len(), 1);

        toasts.prune(start + Duration::from_secs(8));
        assert!(toasts.is_empty());
    }
}
