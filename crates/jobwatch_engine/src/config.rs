use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_EVENT_NAME: &str = "progress";

/// Backoff used by the progress channel between connection attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectSettings {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Next backoff delay, clamped to `max_delay`.
pub fn next_delay(current: Duration, settings: &ReconnectSettings) -> Duration {
    let next_ms = (current.as_millis() as f64 * settings.multiplier) as u64;
    Duration::from_millis(next_ms).min(settings.max_delay)
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Name of the push event carrying job progress.
    pub event_name: String,
    pub reconnect: ReconnectSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            event_name: DEFAULT_EVENT_NAME.to_string(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl ClientSettings {
    /// Settings for a backend at `base`. Relative endpoints resolve below its path.
    pub fn with_base_url(base: &str) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);
        base_url.set_fragment(None);
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/seg1/seg2/...`, each segment percent-encoded on its own.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// WebSocket address of the Socket.IO endpoint.
    pub fn socket_url(&self) -> Url {
        let mut url = self.endpoint(&["socket.io", ""]);
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always a permitted scheme change.
        let _ = url.set_scheme(scheme);
        url.set_query(Some("EIO=4&transport=websocket"));
        url
    }
}
