use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jobwatch_core::{
    update, Effect, JobId, Msg, ProgressEvent, TrackerPhase, TrackerState, TrackerView,
};
use jobwatch_engine::{
    ensure_output_dir, ArtifactFetcher, ChannelStatus, ClientSettings, EngineEvent, EngineHandle,
    ReqwestSubmitter,
};
use tokio::sync::mpsc;
use watch_logging::{watch_error, watch_info, watch_warn};

use crate::effects::{self, EffectRunner};
use crate::render::{summary_line, JobBar};

/// How long to wait for the first progress subscription before giving up.
const CHANNEL_WAIT: Duration = Duration::from_secs(30);

/// Submit every target in turn, tracking each until it ends. Returns whether
/// all of them succeeded.
pub async fn run_downloads(
    settings: ClientSettings,
    targets: Vec<String>,
    save_to: Option<PathBuf>,
) -> Result<bool> {
    let fetcher = match save_to {
        Some(dir) => {
            ensure_output_dir(&dir)
                .with_context(|| format!("cannot use output directory {}", dir.display()))?;
            Some(ArtifactFetcher::new(settings.clone(), dir))
        }
        None => None,
    };
    let saving = fetcher.is_some();
    let (engine, events) = EngineHandle::start(settings.clone(), fetcher);

    let mut app = App {
        run: DownloadLoop::new(saving),
        runner: EffectRunner::new(engine),
        status: ReqwestSubmitter::new(settings.clone()),
        events,
        settings,
    };

    // Progress is broadcast without buffering: submit only once subscribed.
    app.wait_for_channel().await?;

    let mut all_succeeded = true;
    for target in &targets {
        let succeeded = app.track(target).await?;
        all_succeeded &= succeeded;
    }
    app.runner.shutdown();
    Ok(all_succeeded)
}

/// Print a one-shot snapshot of a job. Returns false when the job failed.
pub async fn show_status(settings: ClientSettings, job_id: String) -> Result<bool> {
    let job_id = JobId::new(job_id);
    let submitter = ReqwestSubmitter::new(settings.clone());
    let event = submitter
        .lookup_status(&job_id)
        .await
        .with_context(|| format!("cannot look up job {job_id}"))?;

    let view = snapshot_view(job_id.clone(), event);
    println!("{job_id}: {}", summary_line(&view, &settings));
    Ok(view.phase != TrackerPhase::Failed)
}

fn snapshot_view(job_id: JobId, event: ProgressEvent) -> TrackerView {
    let state = [Msg::ResumeTracking { job_id }, Msg::ProgressReceived(event)]
        .into_iter()
        .fold(TrackerState::new(), |state, msg| update(state, msg).0);
    state.view()
}

/// What the download loop does next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Step {
    #[default]
    Continue,
    /// The channel came back while a job was running; events may have been
    /// missed, so re-read the job's status.
    Resync(JobId),
    /// The job ended; `true` when it counts as a success.
    Finished(bool),
}

/// Result of feeding one input into [`DownloadLoop`].
#[derive(Debug, Default)]
struct StepOutput {
    effects: Vec<Effect>,
    redraw: bool,
    notes: Vec<String>,
    step: Step,
}

/// Decides, event by event, when a submitted job is over and whether it
/// succeeded. Performs no IO.
struct DownloadLoop {
    state: TrackerState,
    saving: bool,
    saved: Option<bool>,
}

impl DownloadLoop {
    fn new(saving: bool) -> Self {
        Self {
            state: TrackerState::new(),
            saving,
            saved: None,
        }
    }

    fn view(&self) -> TrackerView {
        self.state.view()
    }

    fn dispatch(&mut self, msg: Msg, out: &mut StepOutput) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        out.redraw |= state.consume_dirty();
        out.effects.extend(effects);
        self.state = state;
    }

    fn begin(&mut self, target: &str) -> StepOutput {
        self.saved = None;
        let mut out = StepOutput::default();
        self.dispatch(Msg::TargetSubmitted(target.to_string()), &mut out);
        if self.state.view().phase != TrackerPhase::Submitting {
            watch_warn!("Nothing submitted for target {:?}", target);
            out.notes.push(format!("Skipped {target:?}"));
            out.step = Step::Finished(false);
        }
        out
    }

    fn step(&mut self, event: EngineEvent) -> StepOutput {
        let mut out = StepOutput::default();
        match event {
            EngineEvent::ArtifactSaved {
                job_id,
                artifact,
                result,
            } => {
                if self.state.tracked_job() != Some(&job_id) {
                    return out;
                }
                self.saved = Some(match result {
                    Ok(path) => {
                        out.notes
                            .push(format!("Saved {} to {}", artifact, path.display()));
                        true
                    }
                    Err(err) => {
                        watch_error!("Saving {} failed: {}", artifact, err);
                        out.notes.push(format!("Could not save {artifact}: {err}"));
                        false
                    }
                });
            }
            EngineEvent::Channel(status) => {
                watch_info!("Progress channel {}", status);
                if status == ChannelStatus::Connected {
                    if let Some(job_id) = self.running_job() {
                        out.step = Step::Resync(job_id);
                    }
                }
                return out;
            }
            event => match effects::to_msg(event) {
                Some(msg) => self.dispatch(msg, &mut out),
                None => return out,
            },
        }
        out.step = self.completion();
        out
    }

    /// Tracked job that has not reached a terminal state yet.
    fn running_job(&self) -> Option<JobId> {
        let view = self.state.view();
        match view.phase {
            TrackerPhase::Tracking => view.job_id,
            _ => None,
        }
    }

    fn completion(&self) -> Step {
        let view = self.state.view();
        match view.phase {
            TrackerPhase::Succeeded if self.saving && self.saved.is_none() => Step::Continue,
            TrackerPhase::Succeeded => Step::Finished(self.saved.unwrap_or(true)),
            TrackerPhase::Failed => Step::Finished(false),
            TrackerPhase::Idle if view.error.is_some() => Step::Finished(false),
            TrackerPhase::Idle | TrackerPhase::Submitting | TrackerPhase::Tracking => {
                Step::Continue
            }
        }
    }
}

struct App {
    run: DownloadLoop,
    runner: EffectRunner,
    status: ReqwestSubmitter,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    settings: ClientSettings,
}

impl App {
    async fn next_event(&mut self) -> Result<EngineEvent> {
        tokio::select! {
            event = self.events.recv() => event.context("engine stopped"),
            _ = tokio::signal::ctrl_c() => bail!("interrupted"),
        }
    }

    async fn wait_for_channel(&mut self) -> Result<()> {
        let events = &mut self.events;
        let connected = async {
            loop {
                match events.recv().await {
                    Some(EngineEvent::Channel(ChannelStatus::Connected)) => return Ok(()),
                    Some(_) => {}
                    None => bail!("engine stopped"),
                }
            }
        };
        tokio::select! {
            result = tokio::time::timeout(CHANNEL_WAIT, connected) => result
                .with_context(|| format!("progress channel not connected after {CHANNEL_WAIT:?}"))?,
            _ = tokio::signal::ctrl_c() => bail!("interrupted"),
        }
    }

    async fn track(&mut self, target: &str) -> Result<bool> {
        let bar = JobBar::new(target);
        let mut out = self.run.begin(target);
        loop {
            if let Some(succeeded) = self.apply(&bar, out).await {
                return Ok(succeeded);
            }
            let event = self.next_event().await?;
            out = self.run.step(event);
        }
    }

    /// Carry out a step. Returns the job's result once it is over.
    async fn apply(&mut self, bar: &JobBar, mut out: StepOutput) -> Option<bool> {
        loop {
            self.runner.enqueue(std::mem::take(&mut out.effects));
            for note in &out.notes {
                bar.println(note);
            }
            if out.redraw {
                bar.render(&self.run.view());
            }
            match out.step {
                Step::Continue => return None,
                Step::Finished(succeeded) => {
                    bar.finish(&self.run.view(), &self.settings);
                    return Some(succeeded);
                }
                Step::Resync(job_id) => match self.status.lookup_status(&job_id).await {
                    Ok(snapshot) => {
                        watch_info!("Resynced job {} after reconnect", job_id);
                        out = self.run.step(EngineEvent::Progress(snapshot));
                    }
                    Err(err) => {
                        watch_warn!("Status lookup for job {} failed: {}", job_id, err);
                        return None;
                    }
                },
            }
        }
    }
}
