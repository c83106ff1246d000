use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jobwatch_core::{ArtifactRef, JobId};
use jobwatch_engine::{
    ClientSettings, EngineEvent, EngineHandle, JobSubmitter, ProgressChannel, SubmitError,
};
use tokio::sync::mpsc;

#[derive(Default)]
struct ScriptedSubmitter {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl JobSubmitter for ScriptedSubmitter {
    async fn submit(&self, target: &str) -> Result<JobId, SubmitError> {
        self.seen.lock().unwrap().push(target.to_string());
        if target.contains("bad") {
            Err(SubmitError::Rejected("Invalid URL".into()))
        } else {
            Ok(JobId::new("J1"))
        }
    }
}

fn quiet_channel() -> ProgressChannel {
    // Nothing listens here; the channel just keeps backing off.
    let mut settings = ClientSettings::with_base_url("http://127.0.0.1:9").unwrap();
    settings.connect_timeout = Duration::from_millis(100);
    ProgressChannel::new(settings)
}

async fn next_submission(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Result<JobId, SubmitError> {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("engine running");
        if let EngineEvent::Submitted { result } = event {
            return result;
        }
    }
}

#[tokio::test]
async fn submissions_report_their_result() {
    let submitter = Arc::new(ScriptedSubmitter::default());
    let (engine, mut rx) = EngineHandle::start_with(submitter.clone(), quiet_channel(), None);

    engine.submit("https://example.com/p/1");
    assert_eq!(next_submission(&mut rx).await, Ok(JobId::new("J1")));

    engine.submit("bad");
    assert_eq!(
        next_submission(&mut rx).await,
        Err(SubmitError::Rejected("Invalid URL".into()))
    );

    assert_eq!(
        *submitter.seen.lock().unwrap(),
        vec!["https://example.com/p/1".to_string(), "bad".to_string()]
    );
    engine.shutdown();
}

#[tokio::test]
async fn retrieve_without_output_dir_is_a_no_op() {
    let submitter = Arc::new(ScriptedSubmitter::default());
    let (engine, mut rx) = EngineHandle::start_with(submitter, quiet_channel(), None);

    engine.retrieve(JobId::new("J1"), ArtifactRef::new("clip.mp4"));
    engine.submit("https://example.com/p/2");
    // The submission result arrives and no artifact event precedes it.
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(event, EngineEvent::Submitted { .. }), "{event:?}");
    engine.shutdown();
}
