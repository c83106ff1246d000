use jobwatch_core::{JobId, ProgressEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use watch_logging::{watch_debug, watch_info};

use crate::{ClientSettings, SubmitError};

pub const SUBMIT_PATH: &[&str] = &["api", "download"];
pub const STATUS_PATH: &[&str] = &["api", "status"];

/// Starts jobs on the backend.
#[async_trait::async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, target: &str) -> Result<JobId, SubmitError>;
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    url: &'a str,
}

/// Acknowledgement shape shared by the submission and status endpoints.
#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    job: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: ClientSettings,
}

impl ReqwestSubmitter {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::Transport(err.to_string()))
    }

    /// One-shot snapshot of a job, as a progress event for that job.
    pub async fn lookup_status(&self, job_id: &JobId) -> Result<ProgressEvent, SubmitError> {
        let mut segments = STATUS_PATH.to_vec();
        segments.push(job_id.as_str());
        let url = self.settings.endpoint(&segments);
        let client = self.build_client()?;

        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let ack = read_ack(response).await?;
        if !ack.ok {
            return Err(SubmitError::Rejected(ack.error.unwrap_or_default()));
        }
        let mut job = match ack.job {
            Some(Value::Object(job)) => job,
            _ => return Err(SubmitError::InvalidResponse("missing job object".into())),
        };
        job.insert("job_id".to_string(), Value::String(job_id.to_string()));
        serde_json::from_value(Value::Object(job))
            .map_err(|err| SubmitError::InvalidResponse(err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobSubmitter for ReqwestSubmitter {
    async fn submit(&self, target: &str) -> Result<JobId, SubmitError> {
        let url = self.settings.endpoint(SUBMIT_PATH);
        let client = self.build_client()?;
        watch_debug!("POST {} target_len={}", url, target.len());

        let response = client
            .post(url)
            .json(&SubmitRequest { url: target })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let ack = read_ack(response).await?;

        if !ack.ok {
            return Err(SubmitError::Rejected(ack.error.unwrap_or_default()));
        }
        match ack.job_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                watch_info!("Backend accepted job {}", id);
                Ok(JobId::from(id))
            }
            None => Err(SubmitError::InvalidResponse("ok without job_id".into())),
        }
    }
}

/// The backend answers rejections with 4xx and a JSON body, so the body is
/// read first and the status only matters when it does not parse.
async fn read_ack(response: reqwest::Response) -> Result<Ack, SubmitError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;
    match serde_json::from_str::<Ack>(&body) {
        Ok(ack) => Ok(ack),
        Err(err) if status.is_success() => Err(SubmitError::InvalidResponse(err.to_string())),
        Err(_) => Err(SubmitError::HttpStatus(status.as_u16())),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::Timeout;
    }
    SubmitError::Transport(err.to_string())
}
