//! Pure view-state machine. Every transition takes the current state and an
//! input and produces the next state; nothing here performs I/O.

use std::sync::Arc;

use shared::{
    domain::{AnalysisResult, DetailTab, FileCandidate, SelectedImage, SidePanel, ViewState},
    error::{UnknownTab, ValidationError},
    protocol::PredictOutcome,
};

use crate::{
    error::ClientError, presentation::ResultView, preview::PreviewImage, progress::Progress,
};

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze image. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Identifies one submission so late completions can be matched against the
/// submission the state is still waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

/// Identifies one accepted selection, used to drop previews of replaced images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionId(u64);

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub image: Arc<SelectedImage>,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub id: SelectionId,
    pub image: Arc<SelectedImage>,
    /// Submission that was waiting when this selection replaced the old image.
    pub superseded: Option<SubmissionId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PreviewState {
    #[default]
    Empty,
    Pending,
    Ready(Arc<PreviewImage>),
    Failed(String),
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Classified(AnalysisResult),
    Rejected(Option<String>),
    Unreachable,
}

impl From<Result<PredictOutcome, ClientError>> for Settlement {
    fn from(value: Result<PredictOutcome, ClientError>) -> Self {
        match value {
            Ok(PredictOutcome::Classified(result)) => Self::Classified(result),
            Ok(PredictOutcome::Rejected(message)) => Self::Rejected(message),
            Err(_) => Self::Unreachable,
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub side_panel: SidePanel,
    pub view: ViewState,
    pub busy: bool,
    pub selected: Option<Arc<SelectedImage>>,
    pub preview: PreviewState,
    pub result: Option<ResultView>,
    pub error_message: Option<String>,
    pub active_tab: DetailTab,
    pub progress: Progress,
}

#[derive(Debug, Default)]
pub struct ControllerState {
    selected: Option<Arc<SelectedImage>>,
    selection_seq: u64,
    current_selection: Option<SelectionId>,
    submission_seq: u64,
    in_flight: Option<SubmissionId>,
    side_panel: SidePanel,
    view: ViewState,
    preview: PreviewState,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
    active_tab: DetailTab,
    progress: Progress,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn side_panel(&self) -> SidePanel {
        self.side_panel
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn active_tab(&self) -> DetailTab {
        self.active_tab
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Validates and stores a candidate. A rejected candidate only switches the
    /// right-hand group to `Error`; the stored image and left panel stay as they were.
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<Selection, ValidationError> {
        let image = match candidate.validate() {
            Ok(image) => Arc::new(image),
            Err(err) => {
                self.show_error(err.to_string());
                return Err(err);
            }
        };

        self.selection_seq += 1;
        let id = SelectionId(self.selection_seq);
        let superseded = self.in_flight.take();

        self.selected = Some(Arc::clone(&image));
        self.current_selection = Some(id);
        self.side_panel = SidePanel::Preview;
        self.preview = PreviewState::Pending;
        self.view = ViewState::Welcome;
        self.result = None;
        self.error_message = None;
        self.progress = Progress::idle();

        Ok(Selection {
            id,
            image,
            superseded,
        })
    }

    /// Starts a submission if an image is selected and none is in flight.
    pub fn begin_analysis(&mut self) -> Option<Submission> {
        if self.in_flight.is_some() {
            return None;
        }
        let image = Arc::clone(self.selected.as_ref()?);

        self.submission_seq += 1;
        let id = SubmissionId(self.submission_seq);
        self.in_flight = Some(id);
        self.view = ViewState::Loading;
        self.result = None;
        self.error_message = None;
        self.progress = Progress::started();

        Some(Submission { id, image })
    }

    /// Advances the cosmetic indicator. Returns false once the submission is no
    /// longer the one being waited on.
    pub fn advance_progress(&mut self, id: SubmissionId, step: f32) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.progress = self.progress.advanced(step);
        true
    }

    /// Applies the outcome of a submission. Outcomes of superseded submissions
    /// are dropped and `false` is returned.
    pub fn finish_analysis(&mut self, id: SubmissionId, settlement: Settlement) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.in_flight = None;
        self.progress = Progress::completed();

        match settlement {
            Settlement::Classified(result) => {
                self.result = Some(result);
                self.error_message = None;
                self.view = ViewState::Results;
            }
            Settlement::Rejected(message) => {
                self.show_error(message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()));
            }
            Settlement::Unreachable => {
                self.show_error(NETWORK_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    /// Returns to the initial upload state. Returns the submission that was
    /// still in flight, if any.
    pub fn reset(&mut self) -> Option<SubmissionId> {
        let superseded = self.in_flight.take();
        self.selected = None;
        self.current_selection = None;
        self.side_panel = SidePanel::Upload;
        self.view = ViewState::Welcome;
        self.preview = PreviewState::Empty;
        self.result = None;
        self.error_message = None;
        self.active_tab = DetailTab::default();
        self.progress = Progress::idle();
        superseded
    }

    pub fn switch_tab(&mut self, name: &str) -> Result<DetailTab, UnknownTab> {
        let tab = name.parse::<DetailTab>()?;
        self.active_tab = tab;
        Ok(tab)
    }

    pub fn select_tab(&mut self, tab: DetailTab) {
        self.active_tab = tab;
    }

    /// Stores a decoded preview if it still belongs to the current selection.
    pub fn preview_ready(&mut self, id: SelectionId, preview: PreviewState) -> bool {
        if self.current_selection != Some(id) {
            return false;
        }
        self.preview = preview;
        true
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            side_panel: self.side_panel,
            view: self.view,
            busy: self.is_busy(),
            selected: self.selected.clone(),
            preview: self.preview.clone(),
            result: self.result.as_ref().map(ResultView::from_result),
            error_message: self.error_message.clone(),
            active_tab: self.active_tab,
            progress: self.progress,
        }
    }

    fn show_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.view = ViewState::Error;
    }
}
