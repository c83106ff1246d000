mod app;
mod cli;
mod effects;
mod logging;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use jobwatch_engine::ClientSettings;
use watch_logging::watch_info;

use crate::cli::{Command, Opts};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let opts = Opts::parse();
    logging::initialize(opts.log, opts.verbose);

    let settings = ClientSettings::with_base_url(&opts.server)
        .with_context(|| format!("invalid server URL {:?}", opts.server))?;
    watch_info!(
        "jobwatch {} using backend {}",
        env!("CARGO_PKG_VERSION"),
        settings.base_url()
    );

    let succeeded = match opts.command {
        Command::Download { urls, save_to } => app::run_downloads(settings, urls, save_to).await?,
        Command::Status { job_id } => app::show_status(settings, job_id).await?,
    };
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
