use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::percent::parse_percent;
use crate::view_model::{TrackerPhase, TrackerView};
use crate::{ArtifactRef, JobId, JobStatus, ProgressEvent};

/// Reason shown when the backend fails a job without saying why.
pub const JOB_FAILED_FALLBACK: &str = "Unknown error";
/// Reason shown when the backend declines a submission without saying why.
pub const REJECTED_FALLBACK: &str = "Failed to start download";
/// Reason shown when a submission request could not be completed.
pub const TRANSPORT_FALLBACK: &str = "Request failed";

pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const QUEUED_LABEL: &str = "Queued...";

/// Terminal outcome of the tracked job, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Terminal {
    #[default]
    None,
    Succeeded(ArtifactRef),
    Failed(String),
}

/// Display-facing state derived from the applied events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresentationState {
    /// Always within `[0, 100]`.
    pub percent: f64,
    pub status_label: String,
    pub speed_label: String,
    pub eta_label: String,
    pub terminal: Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting {
        target: String,
    },
    Tracking {
        job_id: JobId,
    },
}

/// What applying one progress event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// No job tracked, or the event belongs to another job.
    Ignored,
    Applied,
    /// `done` arrived without a usable `file_path`; the job stays non-terminal.
    AwaitingArtifact,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    phase: Phase,
    presentation: PresentationState,
    submission_error: Option<String>,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    pub fn tracked_job(&self) -> Option<&JobId> {
        match &self.phase {
            Phase::Tracking { job_id } => Some(job_id),
            Phase::Idle | Phase::Submitting { .. } => None,
        }
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    /// The submit control is disabled while a request is in flight and while
    /// a tracked job has not reached a terminal state.
    pub fn submit_enabled(&self) -> bool {
        match &self.phase {
            Phase::Idle => true,
            Phase::Submitting { .. } => false,
            Phase::Tracking { .. } => self.presentation.terminal != Terminal::None,
        }
    }

    pub fn view(&self) -> TrackerView {
        let phase = match (&self.phase, &self.presentation.terminal) {
            (Phase::Idle, _) => TrackerPhase::Idle,
            (Phase::Submitting { .. }, _) => TrackerPhase::Submitting,
            (Phase::Tracking { .. }, Terminal::None) => TrackerPhase::Tracking,
            (Phase::Tracking { .. }, Terminal::Succeeded(_)) => TrackerPhase::Succeeded,
            (Phase::Tracking { .. }, Terminal::Failed(_)) => TrackerPhase::Failed,
        };
        let artifact = match &self.presentation.terminal {
            Terminal::Succeeded(artifact) => Some(artifact.clone()),
            _ => None,
        };
        let error = match &self.presentation.terminal {
            Terminal::Failed(reason) => Some(reason.clone()),
            _ => self.submission_error.clone(),
        };
        TrackerView::new(
            phase,
            self.tracked_job().cloned(),
            &self.presentation,
            artifact,
            error,
            self.submit_enabled(),
            self.dirty,
        )
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_submission(&mut self, target: String) {
        watch_info!("Submitting target len={} target={}", target.len(), target);
        self.presentation = PresentationState {
            status_label: SUBMITTING_LABEL.to_string(),
            ..PresentationState::default()
        };
        self.submission_error = None;
        self.phase = Phase::Submitting { target };
        self.dirty = true;
    }

    pub(crate) fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting { .. })
    }

    pub(crate) fn accept_submission(&mut self, job_id: JobId) {
        watch_info!("Tracking job {}", job_id);
        self.track(job_id, QUEUED_LABEL);
    }

    pub(crate) fn fail_submission(&mut self, reason: String) {
        watch_warn!("Submission failed: {}", reason);
        self.presentation = PresentationState::default();
        self.submission_error = Some(reason);
        self.phase = Phase::Idle;
        self.dirty = true;
    }

    /// Start following a job that was submitted elsewhere.
    pub(crate) fn resume(&mut self, job_id: JobId) {
        watch_info!("Resuming job {}", job_id);
        self.track(job_id, "");
    }

    fn track(&mut self, job_id: JobId, label: &str) {
        self.presentation = PresentationState {
            status_label: label.to_string(),
            ..PresentationState::default()
        };
        self.submission_error = None;
        self.phase = Phase::Tracking { job_id };
        self.dirty = true;
    }

    /// Apply one progress event to the tracked job.
    ///
    /// Events for other jobs, or arriving while nothing is tracked, leave the
    /// state untouched. Matching events overwrite percent and all labels, then
    /// `error` and `done` drive the terminal state. Terminal states do not lock
    /// the tracker: a later event for the same job may override them.
    pub fn apply(&mut self, event: &ProgressEvent) -> EventOutcome {
        match &self.phase {
            Phase::Tracking { job_id } if *job_id == event.job_id => {}
            _ => {
                watch_debug!("Ignoring event for job {}", event.job_id);
                return EventOutcome::Ignored;
            }
        }

        let presentation = &mut self.presentation;
        presentation.percent = parse_percent(event.progress.as_deref());
        presentation.status_label = event.status.label().to_string();
        presentation.speed_label = non_empty(event.speed.as_deref());
        presentation.eta_label = non_empty(event.eta.as_deref());
        self.dirty = true;

        let failure = match &event.status {
            JobStatus::Error => Some(event.usable_error().unwrap_or(JOB_FAILED_FALLBACK)),
            // A done event carrying an error is treated as a failure.
            JobStatus::Done => event.usable_error(),
            _ => None,
        };
        if let Some(reason) = failure {
            watch_info!("Job {} failed: {}", event.job_id, reason);
            presentation.terminal = Terminal::Failed(reason.to_string());
            return EventOutcome::Failed;
        }

        if event.status != JobStatus::Done {
            watch_debug!(
                "Job {} at {:.1}% ({})",
                event.job_id,
                presentation.percent,
                presentation.status_label
            );
            return EventOutcome::Applied;
        }

        match event.usable_file_path() {
            Some(path) => {
                watch_info!("Job {} finished: {}", event.job_id, path);
                presentation.terminal = Terminal::Succeeded(ArtifactRef::new(path));
                EventOutcome::Succeeded
            }
            None => {
                watch_warn!(
                    "Job {} reported done without a file path; still waiting",
                    event.job_id
                );
                EventOutcome::AwaitingArtifact
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_default().to_string()
}
