//! Acquisition runs and loop mode.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::RunArgs;
use crate::acquisition::{AcquisitionConfig, Orchestrator, format_minutes};
use crate::backends::{BackendId, BackendRegistry};
use crate::catalog;
use crate::config::{self, Config};

/// Fetch (or check) every track of the list in `args`.
pub fn cmd_fetch(args: &RunArgs, check_only: bool) -> anyhow::Result<()> {
    let config = config::load();
    let output_dir = output_dir(args, &config)?;
    let acquisition = merge_flags(args, &config, output_dir, check_only);

    let rt = Runtime::new()?;
    rt.block_on(async {
        let orchestrator = Orchestrator::new(acquisition, BackendRegistry::with_defaults());
        let cancel = orchestrator.cancellation_token();
        spawn_ctrl_c_handler(cancel.clone());

        loop {
            let mut batch = catalog::load(&args.tracks)
                .with_context(|| format!("Failed to load track list {:?}", args.tracks))?;
            info!("Loaded {} tracks from {:?}", batch.len(), args.tracks);

            let report = orchestrator.run(&mut batch).await?;
            println!("{}", report);

            let loop_minutes = args.loop_minutes.or(config.run.loop_minutes);
            let Some(minutes) = loop_minutes.filter(|m| *m > 0) else {
                break;
            };
            if cancel.is_cancelled() {
                break;
            }

            println!("Next run in {}", format_minutes(minutes));
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(minutes * 60)) => {}
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

fn output_dir(args: &RunArgs, config: &Config) -> anyhow::Result<PathBuf> {
    args.output_dir
        .clone()
        .or_else(|| config.placement.output_dir.clone())
        .context("No output directory given and none configured")
}

/// Apply command-line flags on top of the config file.
fn merge_flags(
    args: &RunArgs,
    config: &Config,
    output_dir: PathBuf,
    check_only: bool,
) -> AcquisitionConfig {
    let mut acquisition = AcquisitionConfig::from_config(config, output_dir);

    if !args.services.is_empty() {
        acquisition.services = args.services.iter().map(|s| BackendId::from(s.as_str())).collect();
    }
    if let Some(format) = &args.filename_format {
        acquisition.placement.filename_format = format.clone();
    }
    acquisition.placement.artist_subfolders |= args.artist_subfolders;
    acquisition.placement.album_subfolders |= args.album_subfolders;
    acquisition.create_playlist |= args.playlist;
    acquisition.check_only |= check_only;
    if args.no_tags {
        acquisition.embed_tags = false;
    }
    if let Some(concurrency) = args.concurrency {
        acquisition.concurrency = concurrency;
    }
    if let Some(secs) = args.timeout {
        acquisition.backend_timeout = Duration::from_secs(secs);
    }

    acquisition
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, finishing current step");
                cancel.cancel();
            }
            Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
        }
    });
}
