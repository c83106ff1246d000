use std::sync::Arc;

use jobwatch_core::{ArtifactRef, JobId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::artifact::ArtifactFetcher;
use crate::channel::{ChannelProgressSink, ProgressChannel, ProgressSink};
use crate::submit::{JobSubmitter, ReqwestSubmitter};
use crate::{ClientSettings, EngineEvent};

enum EngineCommand {
    Submit { target: String },
    Retrieve { job_id: JobId, artifact: ArtifactRef },
}

/// Runs backend IO as tasks on the current tokio runtime and reports every
/// result through one event receiver.
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    cancel: CancellationToken,
}

impl EngineHandle {
    /// Start with the reqwest submitter. Must be called inside a tokio runtime.
    pub fn start(
        settings: ClientSettings,
        artifacts: Option<ArtifactFetcher>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let submitter = Arc::new(ReqwestSubmitter::new(settings.clone()));
        Self::start_with(submitter, ProgressChannel::new(settings), artifacts)
    }

    pub fn start_with(
        submitter: Arc<dyn JobSubmitter>,
        channel: ProgressChannel,
        artifacts: Option<ArtifactFetcher>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let channel_sink = ChannelProgressSink::new(event_tx.clone());
        let channel_cancel = cancel.clone();
        tokio::spawn(async move {
            channel.run(&channel_sink, &channel_cancel).await;
        });

        let artifacts = artifacts.map(Arc::new);
        let command_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let command = tokio::select! {
                    _ = command_cancel.cancelled() => break,
                    command = cmd_rx.recv() => match command {
                        Some(command) => command,
                        None => break,
                    },
                };
                let submitter = submitter.clone();
                let artifacts = artifacts.clone();
                let sink = ChannelProgressSink::new(event_tx.clone());
                tokio::spawn(async move {
                    handle_command(submitter.as_ref(), artifacts.as_deref(), command, &sink)
                        .await;
                });
            }
        });

        (Self { cmd_tx, cancel }, event_rx)
    }

    pub fn submit(&self, target: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            target: target.into(),
        });
    }

    /// Save a finished artifact. No-op when the engine has no output directory.
    pub fn retrieve(&self, job_id: JobId, artifact: ArtifactRef) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Retrieve { job_id, artifact });
    }

    /// Stop the progress channel and the command loop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn handle_command(
    submitter: &dyn JobSubmitter,
    artifacts: Option<&ArtifactFetcher>,
    command: EngineCommand,
    sink: &dyn ProgressSink,
) {
    match command {
        EngineCommand::Submit { target } => {
            let result = submitter.submit(&target).await;
            sink.emit(EngineEvent::Submitted { result });
        }
        EngineCommand::Retrieve { job_id, artifact } => {
            let Some(fetcher) = artifacts else {
                return;
            };
            let result = fetcher.save(&artifact).await;
            sink.emit(EngineEvent::ArtifactSaved {
                job_id,
                artifact,
                result,
            });
        }
    }
}
