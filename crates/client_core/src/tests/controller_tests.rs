use super::*;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex as StdMutex, OnceLock, Weak,
};

use async_trait::async_trait;
use shared::{
    domain::{DiseaseInfo, SelectedImage, SidePanel, MAX_IMAGE_BYTES},
    protocol::{PredictOutcome, PredictResponse},
};
use tokio::sync::Notify;

use crate::{
    error::ClientError,
    preview::encode_test_png,
    progress::Progress,
    state::{GENERIC_FAILURE_MESSAGE, NETWORK_ERROR_MESSAGE},
};

#[derive(Clone)]
enum Script {
    Respond(PredictResponse),
    Unreachable,
}

struct ScriptedClient {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn predict(&self, _image: &SelectedImage) -> Result<PredictOutcome, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Respond(body) => Ok(body.clone().into_outcome()),
            Script::Unreachable => Err(ClientError::Decode(
                serde_json::from_str::<PredictResponse>("<html>").expect_err("not json"),
            )),
        }
    }
}

/// Holds every request until released so tests can observe the busy state.
struct GatedClient {
    started: Notify,
    release: Notify,
    calls: AtomicUsize,
}

impl GatedClient {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PredictionClient for GatedClient {
    async fn predict(&self, _image: &SelectedImage) -> Result<PredictOutcome, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(PredictResponse::classified("Red Rust", 0.7, DiseaseInfo::default()).into_outcome())
    }
}

#[derive(Default)]
struct RecordingRenderer {
    frames: StdMutex<Vec<ViewSnapshot>>,
}

impl RecordingRenderer {
    fn frames(&self) -> Vec<ViewSnapshot> {
        self.frames.lock().expect("frames lock").clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, snapshot: &ViewSnapshot) {
        self.frames
            .lock()
            .expect("frames lock")
            .push(snapshot.clone());
    }
}

/// Never answers; tracks how many request futures are still alive.
#[derive(Default)]
struct HangingClient {
    live: Arc<AtomicUsize>,
    calls: AtomicUsize,
}

struct LiveRequest(Arc<AtomicUsize>);

impl Drop for LiveRequest {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PredictionClient for HangingClient {
    async fn predict(&self, _image: &SelectedImage) -> Result<PredictOutcome, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let _live = LiveRequest(Arc::clone(&self.live));
        std::future::pending().await
    }
}

/// Resets the controller from inside the first Loading frame, before
/// `analyze` has had a chance to continue past the render.
struct ResetOnLoading {
    controller: OnceLock<Weak<ViewStateController>>,
    runtime: tokio::runtime::Handle,
    fired: AtomicBool,
}

impl Renderer for ResetOnLoading {
    fn render(&self, snapshot: &ViewSnapshot) {
        if snapshot.view != ViewState::Loading || self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(controller) = self.controller.get().and_then(Weak::upgrade) else {
            return;
        };
        let runtime = self.runtime.clone();
        std::thread::spawn(move || runtime.block_on(controller.reset()))
            .join()
            .expect("reset thread");
    }
}

fn fast_settings() -> ControllerSettings {
    ControllerSettings {
        preview_delay: Duration::ZERO,
        progress_tick: Duration::from_millis(5),
        progress_step: 10.0,
    }
}

fn controller_with(
    client: Arc<dyn PredictionClient>,
) -> (Arc<ViewStateController>, Arc<RecordingRenderer>) {
    let renderer = Arc::new(RecordingRenderer::default());
    let controller = ViewStateController::new(client, renderer.clone(), fast_settings());
    (controller, renderer)
}

fn png_candidate() -> FileCandidate {
    FileCandidate::new("leaf.png", "image/png", encode_test_png(4, 4))
}

#[tokio::test]
async fn unsupported_type_keeps_previous_selection() {
    let (controller, _) = controller_with(ScriptedClient::new(Script::Unreachable));
    controller.select_file(png_candidate()).await.expect("valid");

    for declared in ["image/webp", "image/tiff", "application/pdf", ""] {
        let err = controller
            .select_file(FileCandidate::new("x", declared, vec![1, 2, 3]))
            .await
            .expect_err("rejected");
        assert!(matches!(err, ValidationError::UnsupportedMediaType { .. }));

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.view, ViewState::Error);
        assert_eq!(snapshot.side_panel, SidePanel::Preview);
        assert_eq!(
            snapshot.selected.as_deref().map(|image| image.filename()),
            Some("leaf.png")
        );
    }
}

#[tokio::test]
async fn oversized_file_shows_size_error() {
    let (controller, _) = controller_with(ScriptedClient::new(Script::Unreachable));
    let err = controller
        .select_file(FileCandidate::new(
            "huge.bmp",
            "image/bmp",
            vec![0; MAX_IMAGE_BYTES as usize + 1],
        ))
        .await
        .expect_err("too large");

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Error);
    assert_eq!(snapshot.error_message, Some(err.to_string()));
    assert!(snapshot.error_message.unwrap_or_default().contains("16MB"));
}

#[tokio::test]
async fn valid_file_switches_to_preview_and_welcome() {
    let (controller, _) = controller_with(ScriptedClient::new(Script::Unreachable));
    let _ = controller
        .select_file(FileCandidate::new("a.pdf", "application/pdf", vec![1]))
        .await;

    for declared in ["image/png", "image/jpeg", "image/jpg", "image/gif", "image/bmp"] {
        controller
            .select_file(FileCandidate::new("leaf", declared, vec![1, 2, 3]))
            .await
            .expect("accepted");
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.side_panel, SidePanel::Preview);
        assert_eq!(snapshot.view, ViewState::Welcome);
    }
}

#[tokio::test]
async fn preview_is_decoded_after_selection() {
    let (controller, renderer) = controller_with(ScriptedClient::new(Script::Unreachable));
    controller.select_file(png_candidate()).await.expect("valid");

    let mut decoded = None;
    for _ in 0..200 {
        if let PreviewState::Ready(image) = controller.snapshot().await.preview {
            decoded = Some(image);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let decoded = decoded.expect("preview decoded");
    assert_eq!((decoded.width, decoded.height), (4, 4));
    assert!(renderer
        .frames()
        .iter()
        .any(|frame| matches!(frame.preview, PreviewState::Ready(_))));
}

#[tokio::test]
async fn analyze_while_busy_is_a_no_op() {
    let client = GatedClient::new();
    let (controller, _) = controller_with(client.clone());
    controller.select_file(png_candidate()).await.expect("valid");

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.analyze().await })
    };
    client.started.notified().await;

    let before = controller.snapshot().await;
    assert!(before.busy);
    assert_eq!(controller.analyze().await, AnalyzeOutcome::Skipped);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    let after = controller.snapshot().await;
    assert_eq!(after.view, ViewState::Loading);
    assert!(after.busy);

    client.release.notify_one();
    assert_eq!(
        first.await.expect("join"),
        AnalyzeOutcome::Settled(ViewState::Results)
    );
    assert!(!controller.snapshot().await.busy);
}

#[tokio::test]
async fn analyze_without_selection_is_skipped() {
    let client = ScriptedClient::new(Script::Unreachable);
    let (controller, renderer) = controller_with(client.clone());

    assert_eq!(controller.analyze().await, AnalyzeOutcome::Skipped);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    assert!(renderer.frames().is_empty());
}

#[tokio::test]
async fn healthy_response_renders_results() {
    let client = ScriptedClient::new(Script::Respond(PredictResponse::classified(
        "Healthy",
        0.93,
        DiseaseInfo::default(),
    )));
    let (controller, renderer) = controller_with(client);
    controller.select_file(png_candidate()).await.expect("valid");

    assert_eq!(
        controller.analyze().await,
        AnalyzeOutcome::Settled(ViewState::Results)
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Results);
    let result = snapshot.result.expect("result view");
    assert_eq!(result.disease_name, "Healthy");
    assert_eq!(result.confidence_text, "93%");
    assert_eq!(result.severity_text, "None");
    assert_eq!(snapshot.progress, Progress::completed());
    assert_eq!(snapshot.progress.phase().label(), "Complete!");

    let frames = renderer.frames();
    let loading_at = frames
        .iter()
        .position(|frame| frame.view == ViewState::Loading)
        .expect("loading frame");
    let results_at = frames
        .iter()
        .position(|frame| frame.view == ViewState::Results)
        .expect("results frame");
    assert!(loading_at < results_at);
}

#[tokio::test]
async fn rejected_response_shows_service_message() {
    let client = ScriptedClient::new(Script::Respond(PredictResponse::rejected("bad image")));
    let (controller, _) = controller_with(client);
    controller.select_file(png_candidate()).await.expect("valid");

    controller.analyze().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Error);
    assert_eq!(snapshot.error_message.as_deref(), Some("bad image"));
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn rejected_response_without_message_uses_fallback() {
    let client = ScriptedClient::new(Script::Respond(PredictResponse::default()));
    let (controller, _) = controller_with(client);
    controller.select_file(png_candidate()).await.expect("valid");

    controller.analyze().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.error_message.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn transport_failure_shows_connectivity_message_and_clears_busy() {
    let (controller, _) = controller_with(ScriptedClient::new(Script::Unreachable));
    controller.select_file(png_candidate()).await.expect("valid");

    assert_eq!(
        controller.analyze().await,
        AnalyzeOutcome::Settled(ViewState::Error)
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Error);
    assert_eq!(snapshot.error_message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
    assert!(!snapshot.busy);
    assert!(snapshot.progress.is_complete());
}

#[tokio::test]
async fn progress_ticks_are_rendered_while_loading() {
    let client = GatedClient::new();
    let (controller, renderer) = controller_with(client.clone());
    controller.select_file(png_candidate()).await.expect("valid");

    let pending = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.analyze().await })
    };
    client.started.notified().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.release.notify_one();
    pending.await.expect("join");

    let loading: Vec<f32> = renderer
        .frames()
        .iter()
        .filter(|frame| frame.view == ViewState::Loading)
        .map(|frame| frame.progress.percent())
        .collect();
    assert!(loading.len() > 1, "expected progress frames, got {loading:?}");
    assert!(loading.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(loading.iter().all(|percent| *percent <= 90.0));

    let settled = renderer.frames().len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(renderer.frames().len(), settled, "progress kept ticking");
}

#[tokio::test]
async fn reset_returns_to_upload_from_any_state() {
    let client = ScriptedClient::new(Script::Respond(PredictResponse::classified(
        "Algal Spot",
        0.64,
        DiseaseInfo::default(),
    )));
    let (controller, _) = controller_with(client);
    controller.select_file(png_candidate()).await.expect("valid");
    controller.analyze().await;
    controller.switch_tab("symptoms").await.expect("known tab");

    controller.reset().await;
    let once = controller.snapshot().await;
    assert!(once.selected.is_none());
    assert!(!once.busy);
    assert_eq!(once.side_panel, SidePanel::Upload);
    assert_eq!(once.view, ViewState::Welcome);
    assert_eq!(once.active_tab, DetailTab::Description);
    assert_eq!(once.preview, PreviewState::Empty);

    controller.reset().await;
    assert_eq!(controller.snapshot().await, once);
}

#[tokio::test]
async fn reset_supersedes_in_flight_submission() {
    let client = GatedClient::new();
    let (controller, _) = controller_with(client.clone());
    controller.select_file(png_candidate()).await.expect("valid");

    let pending = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.analyze().await })
    };
    client.started.notified().await;
    controller.reset().await;
    client.release.notify_one();

    assert_eq!(pending.await.expect("join"), AnalyzeOutcome::Superseded);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Welcome);
    assert!(snapshot.result.is_none());
    assert!(!snapshot.busy);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reset_during_loading_frame_aborts_request() {
    let client = Arc::new(HangingClient::default());
    let renderer = Arc::new(ResetOnLoading {
        controller: OnceLock::new(),
        runtime: tokio::runtime::Handle::current(),
        fired: AtomicBool::new(false),
    });
    let controller = ViewStateController::new(client.clone(), renderer.clone(), fast_settings());
    let _ = renderer.controller.set(Arc::downgrade(&controller));

    controller.select_file(png_candidate()).await.expect("valid");
    let outcome = tokio::time::timeout(Duration::from_secs(5), controller.analyze())
        .await
        .expect("analyze returns once superseded");

    assert_eq!(outcome, AnalyzeOutcome::Superseded);
    assert!(client.calls.load(Ordering::SeqCst) <= 1);
    assert_eq!(client.live.load(Ordering::SeqCst), 0);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.view, ViewState::Welcome);
    assert!(!snapshot.busy);

    controller.select_file(png_candidate()).await.expect("valid");
    let second = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.analyze().await })
    };
    while client.live.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(client.live.load(Ordering::SeqCst), 1);
    controller.reset().await;
    assert_eq!(second.await.expect("join"), AnalyzeOutcome::Superseded);
    assert_eq!(client.live.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_tab_is_rejected_without_rendering() {
    let (controller, renderer) = controller_with(ScriptedClient::new(Script::Unreachable));
    assert_eq!(
        controller.switch_tab("treatment").await,
        Ok(DetailTab::Treatment)
    );
    let frames = renderer.frames().len();

    assert!(controller.switch_tab("history").await.is_err());
    assert_eq!(renderer.frames().len(), frames);
    assert_eq!(controller.snapshot().await.active_tab, DetailTab::Treatment);
}
