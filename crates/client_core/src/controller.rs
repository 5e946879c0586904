//! View-state controller: turns user actions into state transitions, runs the
//! single outbound submission and pushes snapshots to a renderer.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{DetailTab, FileCandidate, ViewState},
    error::{UnknownTab, ValidationError},
};
use tokio::{sync::Mutex, task::AbortHandle};
use tracing::{debug, info, warn};

use crate::{
    preview::decode_preview,
    progress::ProgressTask,
    state::{ControllerState, PreviewState, Selection, Settlement, SubmissionId, ViewSnapshot},
    PredictionClient,
};

/// Output side of the controller. Implementations must not block; they are
/// called with every state change, including each progress tick.
pub trait Renderer: Send + Sync {
    fn render(&self, snapshot: &ViewSnapshot);
}

pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _snapshot: &ViewSnapshot) {}
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Delay before decoding a preview so the panel swap paints first.
    pub preview_delay: Duration,
    pub progress_tick: Duration,
    pub progress_step: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            preview_delay: Duration::from_millis(100),
            progress_tick: Duration::from_millis(200),
            progress_step: 7.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// No image selected or a submission was already in flight.
    Skipped,
    /// The submission settled and the view moved to `Results` or `Error`.
    Settled(ViewState),
    /// A reset or a new selection replaced the submission before it settled.
    Superseded,
}

struct InFlight {
    id: SubmissionId,
    abort: AbortHandle,
}

pub struct ViewStateController {
    client: Arc<dyn PredictionClient>,
    renderer: Arc<dyn Renderer>,
    settings: ControllerSettings,
    state: Mutex<ControllerState>,
    in_flight: Mutex<Option<InFlight>>,
}

impl ViewStateController {
    pub fn new(
        client: Arc<dyn PredictionClient>,
        renderer: Arc<dyn Renderer>,
        settings: ControllerSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            renderer,
            settings,
            state: Mutex::new(ControllerState::new()),
            in_flight: Mutex::new(None),
        })
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn select_file(
        self: &Arc<Self>,
        candidate: FileCandidate,
    ) -> Result<(), ValidationError> {
        let filename = candidate.filename.clone();
        let mut state = self.state.lock().await;
        let outcome = state.select_file(candidate);
        let snapshot = state.snapshot();
        drop(state);

        let selection = match outcome {
            Ok(selection) => selection,
            Err(err) => {
                warn!(%filename, error = %err, "rejected image selection");
                self.renderer.render(&snapshot);
                return Err(err);
            }
        };

        info!(
            %filename,
            media_type = %selection.image.media_type(),
            size_bytes = selection.image.size_bytes(),
            "image selected"
        );
        if let Some(superseded) = selection.superseded {
            self.abort_submission(superseded).await;
        }
        self.renderer.render(&snapshot);
        self.spawn_preview_decode(selection);
        Ok(())
    }

    /// Submits the selected image and waits until the submission settles.
    pub async fn analyze(self: &Arc<Self>) -> AnalyzeOutcome {
        let mut state = self.state.lock().await;
        let Some(submission) = state.begin_analysis() else {
            debug!(busy = state.is_busy(), "analyze ignored");
            return AnalyzeOutcome::Skipped;
        };
        let snapshot = state.snapshot();

        let id = submission.id;
        let client = Arc::clone(&self.client);
        let image = submission.image;
        let request = tokio::spawn(async move { client.predict(&image).await });
        // Recorded under the state guard so a reset or selection that observes
        // this submission can always abort it.
        *self.in_flight.lock().await = Some(InFlight {
            id,
            abort: request.abort_handle(),
        });
        drop(state);

        self.renderer.render(&snapshot);
        let progress = self.spawn_progress(id);

        let joined = request.await;
        progress.stop();
        self.clear_in_flight(id).await;

        let settlement = match joined {
            Ok(Ok(outcome)) => Settlement::from(Ok(outcome)),
            Ok(Err(err)) => {
                warn!(error = %err, "prediction request failed");
                Settlement::Unreachable
            }
            Err(err) if err.is_cancelled() => {
                debug!("submission superseded before it settled");
                return AnalyzeOutcome::Superseded;
            }
            Err(err) => {
                warn!(error = %err, "prediction task failed");
                Settlement::Unreachable
            }
        };

        let mut state = self.state.lock().await;
        if !state.finish_analysis(id, settlement) {
            return AnalyzeOutcome::Superseded;
        }
        let view = state.view();
        let snapshot = state.snapshot();
        drop(state);

        info!(?view, "analysis settled");
        self.renderer.render(&snapshot);
        AnalyzeOutcome::Settled(view)
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let superseded = state.reset();
        let snapshot = state.snapshot();
        drop(state);

        if let Some(id) = superseded {
            self.abort_submission(id).await;
        }
        debug!("view reset to upload");
        self.renderer.render(&snapshot);
    }

    /// Activates the named detail pane. Unknown names are rejected and leave the
    /// current pane active.
    pub async fn switch_tab(&self, name: &str) -> Result<DetailTab, UnknownTab> {
        let mut state = self.state.lock().await;
        let tab = match state.switch_tab(name) {
            Ok(tab) => tab,
            Err(err) => {
                warn!(tab = name, "ignoring switch to unknown tab");
                return Err(err);
            }
        };
        let snapshot = state.snapshot();
        drop(state);
        self.renderer.render(&snapshot);
        Ok(tab)
    }

    fn spawn_progress(self: &Arc<Self>, id: SubmissionId) -> ProgressTask {
        let controller = Arc::clone(self);
        let step = self.settings.progress_step;
        ProgressTask::spawn(self.settings.progress_tick, move || {
            let controller = Arc::clone(&controller);
            async move {
                let mut state = controller.state.lock().await;
                if !state.advance_progress(id, step) {
                    return false;
                }
                let snapshot = state.snapshot();
                drop(state);
                controller.renderer.render(&snapshot);
                true
            }
        })
    }

    fn spawn_preview_decode(self: &Arc<Self>, selection: Selection) {
        let controller = Arc::clone(self);
        let delay = self.settings.preview_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let image = Arc::clone(&selection.image);
            let preview = match tokio::task::spawn_blocking(move || decode_preview(image.bytes()))
                .await
            {
                Ok(Ok(decoded)) => PreviewState::Ready(Arc::new(decoded)),
                Ok(Err(err)) => {
                    warn!(filename = selection.image.filename(), error = %err, "preview decode failed");
                    PreviewState::Failed(err.to_string())
                }
                Err(err) => {
                    warn!(error = %err, "preview decode task failed");
                    PreviewState::Failed(err.to_string())
                }
            };

            let mut state = controller.state.lock().await;
            if !state.preview_ready(selection.id, preview) {
                return;
            }
            let snapshot = state.snapshot();
            drop(state);
            controller.renderer.render(&snapshot);
        });
    }

    async fn abort_submission(&self, id: SubmissionId) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.as_ref().is_some_and(|current| current.id == id) {
            if let Some(current) = in_flight.take() {
                current.abort.abort();
                info!("aborted superseded submission");
            }
        }
    }

    async fn clear_in_flight(&self, id: SubmissionId) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.as_ref().is_some_and(|current| current.id == id) {
            *in_flight = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
