use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

use crate::{JobId, JobStatus};

/// One push notification describing a job's state.
///
/// Every field except `job_id` is optional on the wire. Scalars arrive as
/// strings from well-behaved backends, but numbers and booleans are accepted
/// and normalized to text; nested values and `null` count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressEvent {
    #[serde(deserialize_with = "job_id_token")]
    pub job_id: JobId,
    #[serde(default, deserialize_with = "status_token")]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "scalar_text")]
    pub progress: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub speed: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub eta: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn new(job_id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            progress: None,
            speed: None,
            eta: None,
            file_path: None,
            error: None,
        }
    }

    pub fn with_progress(mut self, progress: impl Into<String>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn with_speed(mut self, speed: impl Into<String>) -> Self {
        self.speed = Some(speed.into());
        self
    }

    pub fn with_eta(mut self, eta: impl Into<String>) -> Self {
        self.eta = Some(eta.into());
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// `file_path`, if present and not blank.
    pub fn usable_file_path(&self) -> Option<&str> {
        non_blank(self.file_path.as_deref())
    }

    /// `error`, if present and not blank.
    pub fn usable_error(&self) -> Option<&str> {
        non_blank(self.error.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
    Unsupported(IgnoredAny),
}

impl Scalar {
    fn into_text(self) -> Option<String> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Integer(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Flag(b) => Some(b.to_string()),
            Scalar::Unsupported(_) => None,
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.and_then(Scalar::into_text))
}

fn status_token<'de, D>(deserializer: D) -> Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(deserializer).map(JobStatus::from)
}

fn job_id_token<'de, D>(deserializer: D) -> Result<JobId, D::Error>
where
    D: Deserializer<'de>,
{
    match scalar_text(deserializer)? {
        Some(id) if !id.is_empty() => Ok(JobId::from(id)),
        _ => Err(serde::de::Error::custom("job_id must be a non-empty scalar")),
    }
}
