/// Label shown for `processing` events.
pub const PROCESSING_LABEL: &str = "Processing...";
/// Label shown when an event carries no status.
pub const UNSPECIFIED_LABEL: &str = "...";

/// Status token carried by a progress event.
///
/// The backend's vocabulary is open-ended; tokens the tracker does not act on
/// are kept verbatim in [`JobStatus::Other`] so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Error,
    Other(String),
    #[default]
    Unspecified,
}

impl JobStatus {
    /// Classify a raw status token. Matching is exact, like the backend emits it.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Unspecified,
            Some("queued") => Self::Queued,
            Some("processing") => Self::Processing,
            Some("done") => Self::Done,
            Some("error") => Self::Error,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Human label for the status line.
    pub fn label(&self) -> &str {
        match self {
            Self::Processing => PROCESSING_LABEL,
            Self::Unspecified => UNSPECIFIED_LABEL,
            Self::Queued => "queued",
            Self::Done => "done",
            Self::Error => "error",
            Self::Other(label) => label,
        }
    }
}

impl From<Option<String>> for JobStatus {
    fn from(value: Option<String>) -> Self {
        Self::parse(value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_are_classified() {
        assert_eq!(JobStatus::parse(Some("queued")), JobStatus::Queued);
        assert_eq!(JobStatus::parse(Some("processing")), JobStatus::Processing);
        assert_eq!(JobStatus::parse(Some("done")), JobStatus::Done);
        assert_eq!(JobStatus::parse(Some("error")), JobStatus::Error);
    }

    #[test]
    fn empty_and_missing_are_unspecified() {
        assert_eq!(JobStatus::parse(None), JobStatus::Unspecified);
        assert_eq!(JobStatus::parse(Some("")), JobStatus::Unspecified);
        assert_eq!(JobStatus::Unspecified.label(), "...");
    }

    #[test]
    fn unknown_tokens_pass_through_verbatim() {
        let status = JobStatus::parse(Some("downloading"));
        assert_eq!(status, JobStatus::Other("downloading".to_string()));
        assert_eq!(status.label(), "downloading");
        assert_eq!(JobStatus::parse(Some("Done")).label(), "Done");
    }
}
