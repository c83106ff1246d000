#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a target (raw input, trimmed by the update).
    TargetSubmitted(String),
    /// Backend accepted the pending submission.
    SubmissionAccepted { job_id: crate::JobId },
    /// Backend declined the pending submission; `reason` is shown verbatim when present.
    SubmissionRejected { reason: Option<String> },
    /// The submission request could not be completed. `detail` is logged, not shown.
    SubmissionFailed { detail: String },
    /// Follow a job submitted elsewhere, e.g. from a previous session.
    ResumeTracking { job_id: crate::JobId },
    /// A push event arrived on the progress channel.
    ProgressReceived(crate::ProgressEvent),
}
