//! Cosmetic progress shown while a submission is in flight.

use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Highest value the indicator reaches before the submission settles.
pub const PROGRESS_CAP: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    LoadingModel,
    ProcessingImage,
    AnalyzingPatterns,
    Complete,
}

impl ProgressPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingModel => "Loading model...",
            Self::ProcessingImage => "Processing image...",
            Self::AnalyzingPatterns => "Analyzing patterns...",
            Self::Complete => "Complete!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    percent: f32,
}

impl Progress {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn started() -> Self {
        Self { percent: 0.0 }
    }

    pub fn completed() -> Self {
        Self { percent: 100.0 }
    }

    pub fn percent(self) -> f32 {
        self.percent
    }

    pub fn fraction(self) -> f32 {
        self.percent / 100.0
    }

    pub fn is_complete(self) -> bool {
        self.percent >= 100.0
    }

    /// Moves forward by `step`, never past the cap. A completed indicator stays complete.
    pub fn advanced(self, step: f32) -> Self {
        if self.is_complete() {
            return self;
        }
        Self {
            percent: (self.percent + step.max(0.0)).min(PROGRESS_CAP),
        }
    }

    pub fn phase(self) -> ProgressPhase {
        match self.percent {
            p if p >= 100.0 => ProgressPhase::Complete,
            p if p < 30.0 => ProgressPhase::LoadingModel,
            p if p < 60.0 => ProgressPhase::ProcessingImage,
            _ => ProgressPhase::AnalyzingPatterns,
        }
    }
}

/// Periodic task driving the indicator. The task is aborted by [`ProgressTask::stop`]
/// or when the guard is dropped, so an early return or a panic in the caller
/// cannot leave it running.
pub struct ProgressTask {
    handle: Option<JoinHandle<()>>,
}

impl ProgressTask {
    pub fn spawn<F, Fut>(tick: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if !on_tick().await {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressTask {
    fn drop(&mut self) {
        self.abort();
    }
}
