//! Runtime bridge between UI command queue and the view-state controller.

use std::{sync::Arc, thread};

use client_core::{
    controller::AnalyzeOutcome, ClientSettings, HttpPredictionClient, Renderer, ViewSnapshot,
    ViewStateController,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::domain::{FileCandidate, ViewState};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Forwards every snapshot to the UI thread. Frames are dropped rather than
/// blocking the controller when the UI falls behind.
pub struct ChannelRenderer {
    ui_tx: Sender<UiEvent>,
}

impl ChannelRenderer {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl Renderer for ChannelRenderer {
    fn render(&self, snapshot: &ViewSnapshot) {
        match self.ui_tx.try_send(UiEvent::Render(Box::new(snapshot.clone()))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::debug!("ui event queue full; dropped frame"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    let startup_tx = ui_tx.clone();
    let spawned = thread::Builder::new()
        .name("leafscan-backend".into())
        .spawn(move || run_backend(cmd_rx, ui_tx, settings));
    if let Err(err) = spawned {
        tracing::error!("failed to spawn backend worker: {err}");
        let _ = startup_tx.try_send(UiEvent::Error(UiError::from_message(
            UiErrorContext::BackendStartup,
            format!("backend worker startup failure: {err}"),
        )));
    }
}

fn run_backend(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            tracing::error!("failed to build backend runtime: {err}");
            return;
        }
    };

    runtime.block_on(async move {
        let endpoint = match settings.endpoint() {
            Ok(endpoint) => endpoint,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    err.to_string(),
                )));
                tracing::error!(error = %err, "invalid prediction endpoint");
                return;
            }
        };
        tracing::info!(endpoint = %endpoint.url(), "backend worker ready");

        let controller = ViewStateController::new(
            Arc::new(HttpPredictionClient::new(endpoint)),
            Arc::new(ChannelRenderer::new(ui_tx.clone())),
            settings.controller_settings(),
        );
        let _ = ui_tx.try_send(UiEvent::Render(Box::new(controller.snapshot().await)));

        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(&controller, &ui_tx, cmd).await;
        }
        tracing::info!("ui command channel closed; backend worker exiting");
    });
}

pub async fn handle_command(
    controller: &Arc<ViewStateController>,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) {
    match cmd {
        BackendCommand::SelectFile { path } => match tokio::fs::read(&path).await {
            Ok(bytes) => {
                select(controller, FileCandidate::from_path(&path, bytes)).await;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read image");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::SelectFile,
                    format!("could not read {}: {err}", path.display()),
                )));
            }
        },
        BackendCommand::SelectBytes {
            filename,
            declared_mime,
            bytes,
        } => {
            let candidate = FileCandidate::new(filename, declared_mime, bytes.to_vec());
            select(controller, candidate).await;
        }
        BackendCommand::Analyze => {
            let controller = Arc::clone(controller);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                if controller.analyze().await == AnalyzeOutcome::Settled(ViewState::Results) {
                    let snapshot = controller.snapshot().await;
                    if let Some(result) = snapshot.result {
                        let _ = ui_tx.try_send(UiEvent::AnalysisComplete(format!(
                            "Analysis complete: {}",
                            result.disease_name
                        )));
                    }
                }
            });
        }
        BackendCommand::Reset => controller.reset().await,
        BackendCommand::SwitchTab(tab) => {
            if let Err(err) = controller.switch_tab(tab.name()).await {
                tracing::warn!(error = %err, "tab switch rejected");
            }
        }
    }
}

/// Rejections are already rendered as the error panel.
async fn select(controller: &Arc<ViewStateController>, candidate: FileCandidate) {
    if let Err(err) = controller.select_file(candidate).await {
        tracing::debug!(error = %err, "selection rejected");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use client_core::{ControllerSettings, NullRenderer, PredictionEndpoint};
    use crossbeam_channel::bounded;
    use shared::domain::{DetailTab, SidePanel};

    use super::*;
    use crate::controller::events::UiErrorCategory;

    fn offline_controller(renderer: Arc<dyn Renderer>) -> Arc<ViewStateController> {
        let endpoint = PredictionEndpoint::resolve("http://127.0.0.1:9", None).expect("endpoint");
        ViewStateController::new(
            Arc::new(HttpPredictionClient::new(endpoint)),
            renderer,
            ControllerSettings::default(),
        )
    }

    #[test]
    fn channel_renderer_forwards_and_drops_when_full() {
        let (ui_tx, ui_rx) = bounded(1);
        let renderer = ChannelRenderer::new(ui_tx);
        let controller = offline_controller(Arc::new(NullRenderer));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let snapshot = runtime.block_on(controller.snapshot());

        renderer.render(&snapshot);
        renderer.render(&snapshot);
        assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::Render(_))));
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unreadable_path_reports_io_error() {
        let (ui_tx, ui_rx) = bounded(8);
        let controller = offline_controller(Arc::new(NullRenderer));
        handle_command(
            &controller,
            &ui_tx,
            BackendCommand::SelectFile {
                path: PathBuf::from("definitely/not/here/leaf.png"),
            },
        )
        .await;

        let Ok(UiEvent::Error(err)) = ui_rx.try_recv() else {
            panic!("expected an error event");
        };
        assert_eq!(err.category(), UiErrorCategory::Io);
        assert_eq!(controller.snapshot().await.side_panel, SidePanel::Upload);
    }

    #[tokio::test]
    async fn rejected_drop_shows_error_panel_without_toast() {
        let (ui_tx, ui_rx) = bounded(8);
        let controller = offline_controller(Arc::new(ChannelRenderer::new(ui_tx.clone())));
        handle_command(
            &controller,
            &ui_tx,
            BackendCommand::SelectBytes {
                filename: "notes.txt".into(),
                declared_mime: "text/plain".into(),
                bytes: Arc::from(&b"hello"[..]),
            },
        )
        .await;

        let events: Vec<UiEvent> = ui_rx.try_iter().collect();
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|event| matches!(event, UiEvent::Render(_))));
        let Some(UiEvent::Render(frame)) = events.last() else {
            panic!("expected a render");
        };
        assert_eq!(frame.view, ViewState::Error);
        assert_eq!(
            frame.error_message.as_deref(),
            Some("Please select a valid image file (PNG, JPG, JPEG, GIF, or BMP).")
        );
    }

    #[tokio::test]
    async fn tab_command_updates_active_pane() {
        let (ui_tx, _ui_rx) = bounded(8);
        let controller = offline_controller(Arc::new(ChannelRenderer::new(ui_tx.clone())));
        handle_command(&controller, &ui_tx, BackendCommand::SwitchTab(DetailTab::Treatment)).await;
        assert_eq!(controller.snapshot().await.active_tab, DetailTab::Treatment);
    }
}
