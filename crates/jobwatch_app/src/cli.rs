use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobwatch_engine::DEFAULT_BASE_URL;

use crate::logging::LogDestination;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobwatch", version, about = "Submit download jobs and follow their progress")]
pub struct Opts {
    /// Backend base URL.
    #[arg(long, env = "JOBWATCH_SERVER", default_value = DEFAULT_BASE_URL, global = true)]
    pub server: String,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File, global = true)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submit each URL in turn and track it until it finishes.
    Download {
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        /// Save finished artifacts into this directory.
        #[arg(long, value_name = "DIR")]
        save_to: Option<PathBuf>,
    },
    /// Show the current state of a job.
    Status {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },
}
