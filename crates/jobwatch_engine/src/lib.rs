//! Jobwatch engine: backend IO for job submission, progress push and artifacts.
mod artifact;
mod channel;
mod config;
mod engine;
mod filename;
mod packet;
mod persist;
mod submit;
mod types;

pub use artifact::{artifact_url, ArtifactFetcher};
pub use channel::{ChannelProgressSink, ProgressChannel, ProgressSink};
pub use config::{
    next_delay, ClientSettings, ReconnectSettings, DEFAULT_BASE_URL, DEFAULT_EVENT_NAME,
};
pub use engine::EngineHandle;
pub use filename::{available_filename, local_filename};
pub use packet::{
    decode_engine, decode_socket, encode_pong, EnginePacket, FrameError, SocketPacket,
};
pub use persist::{ensure_output_dir, PersistError, StagedFile};
pub use submit::{JobSubmitter, ReqwestSubmitter};
pub use types::{ArtifactError, ChannelError, ChannelStatus, EngineEvent, SubmitError};
