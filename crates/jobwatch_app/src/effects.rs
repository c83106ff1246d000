use jobwatch_core::{Effect, Msg};
use jobwatch_engine::{EngineEvent, EngineHandle, SubmitError};
use watch_logging::{watch_debug, watch_info, watch_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { target } => {
                    watch_info!("SubmitJob target_len={} target={}", target.len(), target);
                    self.engine.submit(target);
                }
                Effect::ArtifactReady { job_id, artifact } => {
                    watch_info!("ArtifactReady job_id={} artifact={}", job_id, artifact);
                    self.engine.retrieve(job_id, artifact);
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

/// Translate an engine event into a core message. Events the core has no
/// message for yield `None`.
pub fn to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Submitted { result } => Some(match result {
            Ok(job_id) => Msg::SubmissionAccepted { job_id },
            Err(SubmitError::Rejected(reason)) => Msg::SubmissionRejected {
                reason: Some(reason),
            },
            Err(err) => {
                watch_warn!("Submission failed: {}", err);
                Msg::SubmissionFailed {
                    detail: err.to_string(),
                }
            }
        }),
        EngineEvent::Progress(event) => Some(Msg::ProgressReceived(event)),
        EngineEvent::Channel(status) => {
            watch_info!("Progress channel {}", status);
            None
        }
        EngineEvent::ArtifactSaved { job_id, .. } => {
            watch_debug!("Artifact event for job {} has no core message", job_id);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobwatch_core::{JobId, JobStatus, ProgressEvent};
    use jobwatch_engine::ChannelStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn submission_results_map_to_messages() {
        assert_eq!(
            to_msg(EngineEvent::Submitted {
                result: Ok(JobId::new("J1"))
            }),
            Some(Msg::SubmissionAccepted {
                job_id: JobId::new("J1")
            })
        );
        assert_eq!(
            to_msg(EngineEvent::Submitted {
                result: Err(SubmitError::Rejected("Invalid URL".into()))
            }),
            Some(Msg::SubmissionRejected {
                reason: Some("Invalid URL".into())
            })
        );
        assert_eq!(
            to_msg(EngineEvent::Submitted {
                result: Err(SubmitError::Timeout)
            }),
            Some(Msg::SubmissionFailed {
                detail: "timeout".into()
            })
        );
    }

    #[test]
    fn progress_passes_through_and_channel_status_does_not() {
        let event = ProgressEvent::new("J1", JobStatus::Processing).with_progress("5%");
        assert_eq!(
            to_msg(EngineEvent::Progress(event.clone())),
            Some(Msg::ProgressReceived(event))
        );
        assert_eq!(to_msg(EngineEvent::Channel(ChannelStatus::Connected)), None);
    }
}
