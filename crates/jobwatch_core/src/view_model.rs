use crate::percent::format_percent;
use crate::state::PresentationState;
use crate::{ArtifactRef, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerPhase {
    #[default]
    Idle,
    Submitting,
    Tracking,
    Succeeded,
    Failed,
}

impl TrackerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TrackerPhase::Succeeded | TrackerPhase::Failed)
    }
}

/// Everything a renderer needs, already formatted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerView {
    pub phase: TrackerPhase,
    pub job_id: Option<JobId>,
    pub percent: f64,
    pub percent_text: String,
    pub status_text: String,
    pub speed_text: String,
    pub eta_text: String,
    pub artifact: Option<ArtifactRef>,
    pub error: Option<String>,
    pub submit_enabled: bool,
    pub retrieve_enabled: bool,
    pub dirty: bool,
}

impl TrackerView {
    pub(crate) fn new(
        phase: TrackerPhase,
        job_id: Option<JobId>,
        presentation: &PresentationState,
        artifact: Option<ArtifactRef>,
        error: Option<String>,
        submit_enabled: bool,
        dirty: bool,
    ) -> Self {
        Self {
            phase,
            job_id,
            percent: presentation.percent,
            percent_text: format_percent(presentation.percent),
            status_text: presentation.status_label.clone(),
            speed_text: prefixed("Speed", &presentation.speed_label),
            eta_text: prefixed("ETA", &presentation.eta_label),
            retrieve_enabled: artifact.is_some(),
            artifact,
            error,
            submit_enabled,
            dirty,
        }
    }
}

fn prefixed(label: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{label}: {value}")
    }
}
