pub mod heatmap;
pub mod progress;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use heatmap::{process_heatmap_command, process_streak_command, HeatmapCommand, StreakCommand};
use progress::{process_progress_command, ProgressCommand};
use tracing::level_filters::LevelFilter;
use watch::{process_watch_command, WatchCommand};

use crate::utils::{
    dir::{create_application_default_path, create_dir},
    logging::{enable_logging, CLI_PREFIX, WATCH_PREFIX},
};

#[derive(Parser, Debug)]
#[command(name = "Streakgrid", version, long_about = None)]
#[command(about = "Activity heatmap, streaks and progress of your habits", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/streakgrid or $HOME/.local/state/streakgrid"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Display a contribution heatmap of your activity")]
    Heatmap {
        #[command(flatten)]
        command: HeatmapCommand,
    },
    #[command(about = "Display current and longest day streak")]
    Streak {
        #[command(flatten)]
        command: StreakCommand,
    },
    #[command(about = "Keep the heatmap on screen and redraw it whenever the snapshot changes")]
    Watch {
        #[command(flatten)]
        command: WatchCommand,
    },
    #[command(about = "Display todo status and project progress")]
    Progress {
        #[command(flatten)]
        command: ProgressCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, create_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let prefix = match args.commands {
        Commands::Watch { .. } => WATCH_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &app_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Heatmap { command } => process_heatmap_command(command, &app_dir).await,
        Commands::Streak { command } => process_streak_command(command, &app_dir).await,
        Commands::Watch { command } => process_watch_command(command, &app_dir).await,
        Commands::Progress { command } => process_progress_command(command, &app_dir).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Args;

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }
}
