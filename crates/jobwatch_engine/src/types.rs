use std::fmt;
use std::path::PathBuf;

use jobwatch_core::{ArtifactRef, JobId, ProgressEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Result of a submission request.
    Submitted { result: Result<JobId, SubmitError> },
    /// A decoded progress event from the push channel.
    Progress(ProgressEvent),
    /// Connection state of the push channel. Informational only.
    Channel(ChannelStatus),
    /// Result of saving a finished artifact locally.
    ArtifactSaved {
        job_id: JobId,
        artifact: ArtifactRef,
        result: Result<PathBuf, ArtifactError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The backend declined the request; the reason is shown to the user as-is.
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("persist error: {0}")]
    Persist(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("namespace refused: {0}")]
    Refused(String),
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Connected => write!(f, "connected"),
            ChannelStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}
