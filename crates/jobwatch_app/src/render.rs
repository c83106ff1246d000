use indicatif::{ProgressBar, ProgressStyle};
use jobwatch_core::{TrackerPhase, TrackerView};
use jobwatch_engine::{artifact_url, ClientSettings};

const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:40.cyan/blue}] {wide_msg}";
const PREFIX_WIDTH: usize = 32;

/// Terminal progress bar for one tracked job.
pub struct JobBar {
    bar: ProgressBar,
}

impl JobBar {
    pub fn new(target: &str) -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_prefix(shorten(target, PREFIX_WIDTH));
        Self { bar }
    }

    pub fn render(&self, view: &TrackerView) {
        self.bar.set_position(view.percent.round() as u64);
        self.bar.set_message(status_line(view));
    }

    pub fn finish(&self, view: &TrackerView, settings: &ClientSettings) {
        self.bar.set_position(view.percent.round() as u64);
        let message = summary_line(view, settings);
        if view.phase == TrackerPhase::Succeeded {
            self.bar.finish_with_message(message);
        } else {
            self.bar.abandon_with_message(message);
        }
    }

    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }
}

/// Percent, status and the optional speed / ETA labels on one line.
pub fn status_line(view: &TrackerView) -> String {
    [
        view.percent_text.as_str(),
        view.status_text.as_str(),
        view.speed_text.as_str(),
        view.eta_text.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("  ")
}

/// One line describing where a job ended up.
pub fn summary_line(view: &TrackerView, settings: &ClientSettings) -> String {
    match view.phase {
        TrackerPhase::Succeeded => match &view.artifact {
            Some(artifact) => format!("Done: {}", artifact_url(settings, artifact)),
            None => "Done".to_string(),
        },
        TrackerPhase::Failed => format!("Failed: {}", view.error.as_deref().unwrap_or_default()),
        TrackerPhase::Idle => match &view.error {
            Some(error) => format!("Not started: {error}"),
            None => "Idle".to_string(),
        },
        TrackerPhase::Submitting | TrackerPhase::Tracking => status_line(view),
    }
}

fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobwatch_core::ArtifactRef;
    use pretty_assertions::assert_eq;

    fn tracking_view() -> TrackerView {
        TrackerView {
            phase: TrackerPhase::Tracking,
            percent: 42.5,
            percent_text: "42.5%".into(),
            status_text: "Processing...".into(),
            speed_text: "Speed: 1.2MiB/s".into(),
            eta_text: String::new(),
            ..TrackerView::default()
        }
    }

    #[test]
    fn status_line_skips_empty_labels() {
        assert_eq!(
            status_line(&tracking_view()),
            "42.5%  Processing...  Speed: 1.2MiB/s"
        );
    }

    #[test]
    fn success_summary_points_at_the_artifact() {
        let settings = ClientSettings::with_base_url("http://host:5000").unwrap();
        let view = TrackerView {
            phase: TrackerPhase::Succeeded,
            artifact: Some(ArtifactRef::new("user__1/clip.mp4")),
            ..tracking_view()
        };
        assert_eq!(
            summary_line(&view, &settings),
            "Done: http://host:5000/files/user__1%2Fclip.mp4"
        );
    }

    #[test]
    fn failure_summaries_carry_the_reason() {
        let settings = ClientSettings::default();
        let failed = TrackerView {
            phase: TrackerPhase::Failed,
            error: Some("Unknown error".into()),
            ..tracking_view()
        };
        assert_eq!(summary_line(&failed, &settings), "Failed: Unknown error");

        let rejected = TrackerView {
            phase: TrackerPhase::Idle,
            error: Some("Invalid URL".into()),
            ..TrackerView::default()
        };
        assert_eq!(summary_line(&rejected, &settings), "Not started: Invalid URL");
    }

    #[test]
    fn long_targets_are_shortened() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("https://example.com/p/abcdef", 12), "https://e...");
    }
}
