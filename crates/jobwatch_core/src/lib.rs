//! Jobwatch core: pure job-tracking state machine and view-model helpers.
mod effect;
mod event;
mod job;
mod msg;
mod percent;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::ProgressEvent;
pub use job::{ArtifactRef, JobId};
pub use msg::Msg;
pub use percent::{clamp_percent, format_percent, parse_percent};
pub use state::{
    EventOutcome, Phase, PresentationState, Terminal, TrackerState, JOB_FAILED_FALLBACK,
    QUEUED_LABEL, REJECTED_FALLBACK, SUBMITTING_LABEL, TRANSPORT_FALLBACK,
};
pub use status::{JobStatus, PROCESSING_LABEL, UNSPECIFIED_LABEL};
pub use update::update;
pub use view_model::{TrackerPhase, TrackerView};
