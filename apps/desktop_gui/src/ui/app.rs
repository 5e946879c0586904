use std::{sync::Arc, time::Duration};

use client_core::{preview::PreviewImage, state::PreviewState, ViewSnapshot};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{declared_mime_for_path, SidePanel, ViewState};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::{
    panels::{self, UiAction},
    widgets::{ToastKind, Toasts},
};

pub const SETTINGS_STORAGE_KEY: &str = "leafscan.desktop_gui.settings";
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGuiSettings {
    pub dark_mode: bool,
    pub upload_panel_width: u16,
}

impl Default for PersistedGuiSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            upload_panel_width: 380,
        }
    }
}

struct PreviewTexture {
    source: Arc<PreviewImage>,
    texture: egui::TextureHandle,
}

pub struct LeafscanApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    snapshot: Option<ViewSnapshot>,
    preview_texture: Option<PreviewTexture>,
    toasts: Toasts,
    status: String,
    settings: PersistedGuiSettings,
    applied_dark_mode: Option<bool>,
}

impl LeafscanApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedGuiSettings>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: None,
            preview_texture: None,
            toasts: Toasts::default(),
            status: "Starting...".to_string(),
            settings: persisted_settings.unwrap_or_default(),
            applied_dark_mode: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Render(snapshot) => self.snapshot = Some(*snapshot),
                UiEvent::Info(message) => self.status = message,
                UiEvent::AnalysisComplete(message) => {
                    self.toasts.push(ToastKind::Success, message);
                }
                UiEvent::Error(err) => self.report(err),
            }
        }
    }

    fn report(&mut self, err: UiError) {
        tracing::warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        self.toasts.push(ToastKind::Warning, err.message());
    }

    fn queue(&mut self, cmd: BackendCommand) {
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            self.report(err);
        }
    }

    fn is_busy(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|snapshot| snapshot.busy)
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_dark_mode == Some(self.settings.dark_mode) {
            return;
        }
        ctx.set_visuals(if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        self.applied_dark_mode = Some(self.settings.dark_mode);
    }

    fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let Some(PreviewState::Ready(image)) = self.snapshot.as_ref().map(|s| &s.preview) else {
            self.preview_texture = None;
            return;
        };
        if self
            .preview_texture
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(&current.source, image))
        {
            return;
        }
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.rgba,
        );
        let texture = ctx.load_texture("leaf-preview", color_image, egui::TextureOptions::LINEAR);
        self.preview_texture = Some(PreviewTexture {
            source: Arc::clone(image),
            texture,
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };
        if self.is_busy() {
            tracing::debug!("ignoring drop while a submission is in flight");
            return;
        }
        match dropped_file_command(file) {
            Some(cmd) => self.queue(cmd),
            None => tracing::warn!(name = %file.name, "dropped file carried no path or bytes"),
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let (escape, enter) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Enter),
            )
        });
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if let Some(action) = keyboard_action(escape, enter, snapshot) {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::OpenFileDialog => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.queue(BackendCommand::SelectFile { path });
                }
            }
            UiAction::Analyze => self.queue(BackendCommand::Analyze),
            UiAction::Reset => self.queue(BackendCommand::Reset),
            UiAction::SelectTab(tab) => self.queue(BackendCommand::SwitchTab(tab)),
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Guava Leaf Disease Detection");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if self.settings.dark_mode { "☀ Light" } else { "🌙 Dark" };
                    if ui.button(label).clicked() {
                        self.settings.dark_mode = !self.settings.dark_mode;
                    }
                    ui.weak(&self.status);
                });
            });
        });
    }

    fn show_upload_panel(&mut self, ctx: &egui::Context) -> Option<UiAction> {
        let drop_hover = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let mut action = None;
        let response = egui::SidePanel::left("upload_panel")
            .resizable(true)
            .default_width(f32::from(self.settings.upload_panel_width))
            .width_range(280.0..=560.0)
            .show(ctx, |ui| {
                ui.add_space(12.0);
                let Some(snapshot) = &self.snapshot else {
                    ui.spinner();
                    return;
                };
                action = match snapshot.side_panel {
                    SidePanel::Upload => panels::upload_card(ui, drop_hover, snapshot.busy),
                    SidePanel::Preview => panels::preview_card(
                        ui,
                        snapshot,
                        self.preview_texture.as_ref().map(|p| &p.texture),
                    ),
                };
            });
        self.settings.upload_panel_width = response.response.rect.width().round() as u16;
        action
    }

    fn show_result_panel(&mut self, ctx: &egui::Context) -> Option<UiAction> {
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(snapshot) = &self.snapshot else {
                return;
            };
            egui::ScrollArea::vertical().show(ui, |ui| {
                action = match snapshot.view {
                    ViewState::Welcome => {
                        panels::welcome_panel(ui);
                        None
                    }
                    ViewState::Loading => {
                        panels::loading_panel(ui, snapshot);
                        None
                    }
                    ViewState::Results => panels::results_panel(ui, snapshot),
                    ViewState::Error => panels::error_panel(ui, snapshot),
                };
            });
        });
        action
    }
}

/// Maps `Escape` to reset and `Enter` to analyze while a preview is shown
/// and nothing is in flight.
pub fn keyboard_action(escape: bool, enter: bool, snapshot: &ViewSnapshot) -> Option<UiAction> {
    if escape {
        return Some(UiAction::Reset);
    }
    if enter && snapshot.side_panel == SidePanel::Preview && !snapshot.busy {
        return Some(UiAction::Analyze);
    }
    None
}

pub fn dropped_file_command(file: &egui::DroppedFile) -> Option<BackendCommand> {
    if let Some(path) = &file.path {
        return Some(BackendCommand::SelectFile { path: path.clone() });
    }
    let bytes = file.bytes.clone()?;
    let declared_mime = if file.mime.trim().is_empty() {
        declared_mime_for_path(std::path::Path::new(&file.name))
    } else {
        file.mime.clone()
    };
    Some(BackendCommand::SelectBytes {
        filename: file.name.clone(),
        declared_mime,
        bytes,
    })
}

impl eframe::App for LeafscanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_theme_if_needed(ctx);
        self.sync_preview_texture(ctx);
        self.handle_dropped_files(ctx);
        self.handle_keyboard(ctx);

        self.show_top_bar(ctx);
        let left = self.show_upload_panel(ctx);
        let right = self.show_result_panel(ctx);
        for action in [left, right].into_iter().flatten() {
            self.apply_action(action);
        }
        self.toasts.show(ctx);

        if self.is_busy() || !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
