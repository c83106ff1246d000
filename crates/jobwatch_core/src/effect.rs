#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue the submission request for `target`.
    SubmitJob { target: String },
    /// The tracked job just succeeded; its artifact can be retrieved.
    ArtifactReady {
        job_id: crate::JobId,
        artifact: crate::ArtifactRef,
    },
}
