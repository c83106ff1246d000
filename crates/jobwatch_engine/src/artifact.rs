use std::path::PathBuf;

use futures_util::StreamExt;
use jobwatch_core::ArtifactRef;
use url::Url;
use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::filename::{available_filename, local_filename};
use crate::persist::StagedFile;
use crate::{ArtifactError, ClientSettings};

pub const FILES_PATH: &str = "files";

/// Retrievable location of a finished artifact: `{base}/files/<path>`, with
/// the whole path encoded as a single segment.
pub fn artifact_url(settings: &ClientSettings, artifact: &ArtifactRef) -> Url {
    settings.endpoint(&[FILES_PATH, artifact.as_str()])
}

/// Streams finished artifacts into a local directory.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    settings: ClientSettings,
    output_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(settings: ClientSettings, output_dir: PathBuf) -> Self {
        Self {
            settings,
            output_dir,
        }
    }

    pub async fn save(&self, artifact: &ArtifactRef) -> Result<PathBuf, ArtifactError> {
        let url = artifact_url(&self.settings, artifact);
        // No overall timeout: artifacts can be large.
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| ArtifactError::Transport(err.to_string()))?;

        watch_debug!("GET {}", url);
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| ArtifactError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::HttpStatus(status.as_u16()));
        }

        let wanted = local_filename(artifact.as_str());
        let filename = available_filename(&self.output_dir, &wanted);
        if filename != wanted {
            watch_warn!("{} already exists in {:?}; saving as {}", wanted, self.output_dir, filename);
        }
        let mut staged = StagedFile::create(&self.output_dir, &filename)
            .map_err(|err| ArtifactError::Persist(err.to_string()))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| ArtifactError::Transport(err.to_string()))?;
            staged
                .write_chunk(&chunk)
                .map_err(|err| ArtifactError::Persist(err.to_string()))?;
        }

        let written = staged.written();
        let path = staged
            .commit()
            .map_err(|err| ArtifactError::Persist(err.to_string()))?;
        watch_info!("Saved artifact {} ({} bytes) to {:?}", artifact, written, path);
        Ok(path)
    }
}
