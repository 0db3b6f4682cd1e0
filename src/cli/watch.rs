use std::{path::Path, time::Duration};

use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::{
    activity::grid::GridOptions,
    storage::snapshot::FileSnapshotSource,
    utils::clock::{Clock, DefaultClock, FixedClock},
    watch::{refresh::ReportRenderer, start_watch, DEFAULT_POLL_INTERVAL},
};

use super::heatmap::{render_options, GridArgs, SourceArgs};

#[derive(Debug, clap::Args)]
pub struct WatchCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    grid: GridArgs,
    #[arg(
        long,
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between snapshot checks"
    )]
    interval: u64,
    #[arg(long, help = "Use plain characters instead of colors")]
    no_color: bool,
}

/// Command to process `watch` command. Redraws the heatmap until interrupted.
pub async fn process_watch_command(
    WatchCommand {
        source,
        grid,
        interval,
        no_color,
    }: WatchCommand,
    app_dir: &Path,
) -> Result<()> {
    let options: GridOptions = grid.into();
    // Configuration errors should show up now, not on the first refresh.
    options.validate()?;

    let snapshot = source.snapshot_source(app_dir);
    info!("Watching {:?} every {interval}s", snapshot.path());
    let interval = Duration::from_secs(interval);

    match source.fixed_today()? {
        Some(today) => watch_with_clock(snapshot, options, no_color, interval, FixedClock(today)).await,
        None => {
            info!("Evaluating against local date, currently {}", Local::now().date_naive());
            watch_with_clock(snapshot, options, no_color, interval, DefaultClock).await
        }
    }
}

async fn watch_with_clock(
    snapshot: FileSnapshotSource,
    options: GridOptions,
    no_color: bool,
    interval: Duration,
    clock: impl Clock,
) -> Result<()> {
    let renderer = ReportRenderer::new(options, render_options(no_color), std::io::stdout());
    start_watch(snapshot, renderer, interval, clock).await
}
