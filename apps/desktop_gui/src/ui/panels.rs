//! Left (upload/preview) and right (welcome/loading/results/error) panels.

use client_core::{presentation::file_size_text, state::PreviewState, ViewSnapshot};
use eframe::egui;
use shared::domain::DetailTab;

use crate::ui::theme;

/// What the user asked for while drawing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    OpenFileDialog,
    Analyze,
    Reset,
    SelectTab(DetailTab),
}

fn card(ui: &mut egui::Ui, stroke: egui::Stroke, add: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::NONE
        .fill(ui.visuals().faint_bg_color)
        .stroke(stroke)
        .corner_radius(14.0)
        .inner_margin(egui::Margin::symmetric(20, 18))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);
            add(ui);
        });
}

pub fn upload_card(ui: &mut egui::Ui, drop_hover: bool, busy: bool) -> Option<UiAction> {
    let stroke = if drop_hover {
        egui::Stroke::new(2.0, theme::DROP_HIGHLIGHT)
    } else {
        egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };
    let mut action = None;
    card(ui, stroke, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Upload a guava leaf image");
            let hint = if drop_hover {
                "Release to use this image"
            } else {
                "Drag and drop an image here, or browse for one"
            };
            ui.label(hint);
            if ui
                .add_enabled(!busy, egui::Button::new("Choose image..."))
                .clicked()
            {
                action = Some(UiAction::OpenFileDialog);
            }
            ui.small("PNG, JPG, JPEG, GIF or BMP up to 16 MB");
        });
    });
    action
}

pub fn preview_card(
    ui: &mut egui::Ui,
    snapshot: &ViewSnapshot,
    texture: Option<&egui::TextureHandle>,
) -> Option<UiAction> {
    let stroke = egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color);
    let mut action = None;
    card(ui, stroke, |ui| {
        ui.vertical_centered(|ui| {
            match (&snapshot.preview, texture) {
                (PreviewState::Ready(_), Some(texture)) => {
                    ui.add(egui::Image::new(texture).max_size(egui::vec2(360.0, 360.0)));
                }
                (PreviewState::Failed(reason), _) => {
                    ui.colored_label(theme::WARNING, format!("Preview unavailable: {reason}"));
                }
                _ => {
                    ui.spinner();
                }
            }

            if let Some(image) = &snapshot.selected {
                ui.strong(image.filename());
                ui.label(format!(
                    "{} · {}",
                    image.media_type(),
                    file_size_text(image.size_bytes())
                ));
            }

            ui.horizontal(|ui| {
                let analyze = egui::Button::new("Analyze").fill(theme::ACCENT);
                if ui.add_enabled(!snapshot.busy, analyze).clicked() {
                    action = Some(UiAction::Analyze);
                }
                if ui
                    .add_enabled(!snapshot.busy, egui::Button::new("Change image"))
                    .clicked()
                {
                    action = Some(UiAction::Reset);
                }
            });
        });
    });
    action
}

pub fn welcome_panel(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading("🍃 Guava Leaf Disease Detection");
        ui.label("Upload a photo of a guava leaf to identify diseases and pests.");
        ui.add_space(12.0);
        for line in [
            "1. Choose or drop a clear image of a single leaf.",
            "2. Press Analyze (or Enter).",
            "3. Review the diagnosis and recommended treatment.",
        ] {
            ui.label(line);
        }
    });
}

pub fn loading_panel(ui: &mut egui::Ui, snapshot: &ViewSnapshot) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.spinner();
        ui.heading("Analyzing leaf...");
        ui.add(
            egui::ProgressBar::new(snapshot.progress.fraction())
                .show_percentage()
                .fill(theme::ACCENT),
        );
        ui.label(snapshot.progress.phase().label());
    });
}

pub fn results_panel(ui: &mut egui::Ui, snapshot: &ViewSnapshot) -> Option<UiAction> {
    let result = snapshot.result.as_ref()?;
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(result.icon.glyph.symbol())
                .size(36.0)
                .color(theme::color_from_hex(result.icon.color)),
        );
        ui.vertical(|ui| {
            ui.heading(&result.disease_name);
            ui.label(format!("Confidence: {}", result.confidence_text));
        });
    });

    let badge = theme::color_from_hex(&result.severity_color);
    egui::Frame::NONE
        .fill(badge)
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(8, 4))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(format!("Severity: {}", result.severity_text))
                    .color(theme::text_on(badge)),
            );
        });

    ui.separator();
    let mut active = snapshot.active_tab;
    ui.horizontal(|ui| {
        for tab in DetailTab::ALL {
            ui.selectable_value(&mut active, tab, tab.title());
        }
    });
    if active != snapshot.active_tab {
        action = Some(UiAction::SelectTab(active));
    }
    ui.label(result.detail(snapshot.active_tab));

    ui.add_space(12.0);
    if ui
        .add_enabled(!snapshot.busy, egui::Button::new("New analysis"))
        .clicked()
    {
        action = Some(UiAction::Reset);
    }
    action
}

pub fn error_panel(ui: &mut egui::Ui, snapshot: &ViewSnapshot) -> Option<UiAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading(egui::RichText::new("Analysis failed").color(theme::ERROR));
        if let Some(message) = &snapshot.error_message {
            ui.label(message);
        }
        if ui
            .add_enabled(!snapshot.busy, egui::Button::new("Try again"))
            .clicked()
        {
            action = Some(UiAction::Reset);
        }
    });
    action
}
