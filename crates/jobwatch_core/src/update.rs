use watch_logging::{watch_debug, watch_warn};

use crate::state::{EventOutcome, Terminal, REJECTED_FALLBACK, TRANSPORT_FALLBACK};
use crate::{Effect, Msg, TrackerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let effects = match msg {
        Msg::TargetSubmitted(raw) => {
            let target = raw.trim();
            if target.is_empty() {
                return (state, Vec::new());
            }
            if !state.submit_enabled() {
                watch_debug!("Submit ignored while the control is disabled");
                return (state, Vec::new());
            }
            state.begin_submission(target.to_string());
            vec![Effect::SubmitJob {
                target: target.to_string(),
            }]
        }
        Msg::SubmissionAccepted { job_id } => {
            if state.is_submitting() {
                state.accept_submission(job_id);
            } else {
                watch_warn!("Dropping acceptance of job {} with no submission pending", job_id);
            }
            Vec::new()
        }
        Msg::SubmissionRejected { reason } => {
            if state.is_submitting() {
                let reason = reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
                state.fail_submission(reason);
            }
            Vec::new()
        }
        Msg::SubmissionFailed { detail } => {
            if state.is_submitting() {
                watch_debug!("Submission transport failure: {}", detail);
                state.fail_submission(TRANSPORT_FALLBACK.to_string());
            }
            Vec::new()
        }
        Msg::ResumeTracking { job_id } => {
            if state.is_submitting() {
                watch_debug!("Resume of {} ignored while submitting", job_id);
            } else {
                state.resume(job_id);
            }
            Vec::new()
        }
        Msg::ProgressReceived(event) => {
            let before = state.presentation().terminal.clone();
            match state.apply(&event) {
                EventOutcome::Succeeded => match &state.presentation().terminal {
                    Terminal::Succeeded(artifact) if before != state.presentation().terminal => {
                        vec![Effect::ArtifactReady {
                            job_id: event.job_id,
                            artifact: artifact.clone(),
                        }]
                    }
                    _ => Vec::new(),
                },
                EventOutcome::Ignored
                | EventOutcome::Applied
                | EventOutcome::AwaitingArtifact
                | EventOutcome::Failed => Vec::new(),
            }
        }
    };

    (state, effects)
}
