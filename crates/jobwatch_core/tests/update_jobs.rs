use jobwatch_core::{
    update, ArtifactRef, Effect, EventOutcome, JobId, JobStatus, Msg, ProgressEvent, Terminal,
    TrackerPhase, TrackerState, JOB_FAILED_FALLBACK, PROCESSING_LABEL, UNSPECIFIED_LABEL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    watch_logging::initialize_for_tests();
}

fn tracking(job_id: &str) -> TrackerState {
    let (state, _) = update(
        TrackerState::new(),
        Msg::TargetSubmitted("http://example.com/a.mp4".to_string()),
    );
    let (state, _) = update(
        state,
        Msg::SubmissionAccepted {
            job_id: JobId::from(job_id),
        },
    );
    state
}

fn receive(state: TrackerState, event: ProgressEvent) -> (TrackerState, Vec<Effect>) {
    update(state, Msg::ProgressReceived(event))
}

#[test]
fn end_to_end_scenario_ignores_foreign_job() {
    init_logging();
    let (state, effects) = update(
        TrackerState::new(),
        Msg::TargetSubmitted("http://example.com/a.mp4".to_string()),
    );
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            target: "http://example.com/a.mp4".to_string()
        }]
    );
    let (state, _) = update(
        state,
        Msg::SubmissionAccepted {
            job_id: JobId::from("J1"),
        },
    );

    let (state, _) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Processing).with_progress("12%"),
    );
    assert_eq!(state.presentation().percent, 12.0);

    let before = state.clone();
    let (state, effects) = receive(
        state,
        ProgressEvent::new("J2", JobStatus::Done).with_file_path("x"),
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Done).with_file_path("a.mp4"),
    );
    assert_eq!(
        state.presentation().terminal,
        Terminal::Succeeded(ArtifactRef::new("a.mp4"))
    );
    assert_eq!(
        effects,
        vec![Effect::ArtifactReady {
            job_id: JobId::from("J1"),
            artifact: ArtifactRef::new("a.mp4"),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, TrackerPhase::Succeeded);
    assert_eq!(view.artifact, Some(ArtifactRef::new("a.mp4")));
    assert!(view.retrieve_enabled);
    assert!(view.submit_enabled);
}

#[test]
fn foreign_events_never_mutate_state() {
    init_logging();
    let mut state = tracking("J1");
    assert!(state.consume_dirty());
    let before = state.clone();

    for status in [
        JobStatus::Processing,
        JobStatus::Done,
        JobStatus::Error,
        JobStatus::Other("downloading".to_string()),
        JobStatus::Unspecified,
    ] {
        let event = ProgressEvent::new("other", status)
            .with_progress("99%")
            .with_file_path("f.mp4")
            .with_error("boom");
        assert_eq!(state.apply(&event), EventOutcome::Ignored);
    }

    assert_eq!(state, before);
    assert!(!state.consume_dirty());
}

#[test]
fn events_without_tracked_job_are_ignored() {
    init_logging();
    let mut state = TrackerState::new();
    let event = ProgressEvent::new("J1", JobStatus::Processing).with_progress("50%");

    assert_eq!(state.apply(&event), EventOutcome::Ignored);
    assert_eq!(state, TrackerState::new());
}

#[test]
fn percent_is_parsed_and_clamped() {
    init_logging();
    let cases = [
        ("37.2%", 37.2),
        ("  50 % ", 50.0),
        ("abc", 0.0),
        ("150%", 100.0),
        ("-20%", 0.0),
    ];
    let mut state = tracking("J1");
    for (raw, expected) in cases {
        state.apply(&ProgressEvent::new("J1", JobStatus::Processing).with_progress(raw));
        assert_eq!(state.presentation().percent, expected, "input {raw:?}");
    }

    state.apply(&ProgressEvent::new("J1", JobStatus::Processing));
    assert_eq!(state.presentation().percent, 0.0);
    assert_eq!(state.view().percent_text, "0%");
}

#[test]
fn status_labels_follow_the_status_token() {
    init_logging();
    let mut state = tracking("J1");

    state.apply(
        &ProgressEvent::new("J1", JobStatus::Processing)
            .with_progress("100%")
            .with_speed("fast")
            .with_error("ignored"),
    );
    assert_eq!(state.view().status_text, PROCESSING_LABEL);
    assert_eq!(state.presentation().terminal, Terminal::None);

    state.apply(&ProgressEvent::new("J1", JobStatus::Other("downloading".to_string())));
    assert_eq!(state.view().status_text, "downloading");

    state.apply(&ProgressEvent::new("J1", JobStatus::Unspecified));
    assert_eq!(state.view().status_text, UNSPECIFIED_LABEL);
}

#[test]
fn speed_and_eta_are_overwritten_by_every_event() {
    init_logging();
    let mut state = tracking("J1");

    state.apply(
        &ProgressEvent::new("J1", JobStatus::Other("downloading".to_string()))
            .with_progress("10%")
            .with_speed("2.1MiB/s")
            .with_eta("00:42"),
    );
    let view = state.view();
    assert_eq!(view.speed_text, "Speed: 2.1MiB/s");
    assert_eq!(view.eta_text, "ETA: 00:42");

    state.apply(
        &ProgressEvent::new("J1", JobStatus::Other("downloading".to_string()))
            .with_progress("20%")
            .with_speed(""),
    );
    let presentation = state.presentation();
    assert_eq!(presentation.speed_label, "");
    assert_eq!(presentation.eta_label, "");
    let view = state.view();
    assert_eq!(view.speed_text, "");
    assert_eq!(view.eta_text, "");
}

#[test]
fn error_with_reason_fails_the_job() {
    init_logging();
    let state = tracking("J1");
    let (state, effects) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Error).with_error("disk full"),
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.presentation().terminal,
        Terminal::Failed("disk full".to_string())
    );
    let view = state.view();
    assert_eq!(view.phase, TrackerPhase::Failed);
    assert_eq!(view.error.as_deref(), Some("disk full"));
    assert!(view.submit_enabled);
    assert!(!view.retrieve_enabled);
}

#[test]
fn error_without_reason_uses_fallback() {
    init_logging();
    let mut state = tracking("J1");

    assert_eq!(
        state.apply(&ProgressEvent::new("J1", JobStatus::Error)),
        EventOutcome::Failed
    );
    assert_eq!(state.view().error.as_deref(), Some(JOB_FAILED_FALLBACK));
}

#[test]
fn done_without_file_path_keeps_waiting() {
    init_logging();
    let mut state = tracking("J1");

    let outcome = state.apply(
        &ProgressEvent::new("J1", JobStatus::Done)
            .with_progress("100%")
            .with_file_path("   "),
    );

    assert_eq!(outcome, EventOutcome::AwaitingArtifact);
    assert_eq!(state.presentation().terminal, Terminal::None);
    let view = state.view();
    assert_eq!(view.phase, TrackerPhase::Tracking);
    assert_eq!(view.percent_text, "100%");
    assert!(!view.submit_enabled);

    let outcome = state.apply(&ProgressEvent::new("J1", JobStatus::Done).with_file_path("a.mp4"));
    assert_eq!(outcome, EventOutcome::Succeeded);
}

#[test]
fn error_takes_precedence_over_done() {
    init_logging();
    let mut state = tracking("J1");

    let outcome = state.apply(
        &ProgressEvent::new("J1", JobStatus::Done)
            .with_file_path("a.mp4")
            .with_error("merge failed"),
    );

    assert_eq!(outcome, EventOutcome::Failed);
    assert_eq!(
        state.presentation().terminal,
        Terminal::Failed("merge failed".to_string())
    );
}

#[test]
fn late_events_still_apply_after_terminal() {
    init_logging();
    let state = tracking("J1");
    let (state, _) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Done).with_file_path("a.mp4"),
    );
    assert_eq!(state.view().phase, TrackerPhase::Succeeded);

    let (state, effects) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Error).with_error("post-processing failed"),
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, TrackerPhase::Failed);
    assert_eq!(state.view().error.as_deref(), Some("post-processing failed"));

    let (state, effects) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Done).with_file_path("a.mp4"),
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().phase, TrackerPhase::Succeeded);
}

#[test]
fn repeated_done_announces_artifact_once() {
    init_logging();
    let state = tracking("J1");
    let done = ProgressEvent::new("J1", JobStatus::Done).with_file_path("a.mp4");

    let (state, first) = receive(state, done.clone());
    let (state, second) = receive(state, done);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(state.view().phase, TrackerPhase::Succeeded);
}

#[test]
fn superseded_job_events_are_abandoned() {
    init_logging();
    let state = tracking("J1");
    let (state, _) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Error).with_error("boom"),
    );
    let (state, _) = update(
        state,
        Msg::TargetSubmitted("http://example.com/b.mp4".to_string()),
    );
    let (state, _) = update(
        state,
        Msg::SubmissionAccepted {
            job_id: JobId::from("J2"),
        },
    );

    let before = state.clone();
    let (state, _) = receive(
        state,
        ProgressEvent::new("J1", JobStatus::Done).with_file_path("late.mp4"),
    );
    assert_eq!(state, before);

    let (state, _) = receive(
        state,
        ProgressEvent::new("J2", JobStatus::Processing).with_progress("5%"),
    );
    assert_eq!(state.presentation().percent, 5.0);
}
