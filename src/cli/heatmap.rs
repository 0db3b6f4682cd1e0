use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::CommandFactory;
use tracing::info;

use crate::{
    activity::{
        analyze,
        grid::{GridOptions, WeekStart, DEFAULT_WEEKS},
        intensity::IntensityPolicy,
    },
    render::{render_report, RenderOptions},
    storage::{
        activity_path,
        snapshot::{FileSnapshotSource, SnapshotSource},
    },
    utils::time::{date_to_record_name, parse_day, DateStyle},
};

use super::Args;

/// Ten years of columns. Anything wider doesn't fit a terminal anyway.
const MAX_WEEKS: u32 = 520;

/// Where the snapshot comes from and which day it's evaluated against.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    #[arg(
        long,
        short,
        help = "Activity snapshot, json lines or a json array of {\"activity_date\", \"count\"}. By default activity.jsonl in the application directory"
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        help = "Evaluate as of this day instead of today. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\", \"2025-03-15\""
    )]
    today: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl SourceArgs {
    pub fn snapshot_source(&self, app_dir: &Path) -> FileSnapshotSource {
        FileSnapshotSource::new(self.file.clone().unwrap_or_else(|| activity_path(app_dir)))
    }

    /// `None` means the current day, whatever it is at the time of evaluation.
    pub fn fixed_today(&self) -> Result<Option<NaiveDate>> {
        let Some(today) = &self.today else {
            return Ok(None);
        };
        match parse_day(today, Local::now(), self.date_style) {
            Ok(v) => Ok(Some(v)),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate today {e}"),
                )
                .into()),
        }
    }

    pub fn evaluation_date(&self) -> Result<NaiveDate> {
        Ok(self
            .fixed_today()?
            .unwrap_or_else(|| Local::now().date_naive()))
    }
}

/// Shape of the heatmap.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct GridArgs {
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_WEEKS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_WEEKS as i64),
        help = "Number of week columns"
    )]
    weeks: u32,
    #[arg(long, default_value_t = WeekStart::Sunday, help = "Day each week column starts with")]
    week_start: WeekStart,
    #[arg(
        long = "thresholds",
        default_value_t = IntensityPolicy::Quartile,
        help = "How cells are shaded. Either quartile, relative to the busiest day, or 4 ascending boundaries like 1,3,5,7"
    )]
    intensity: IntensityPolicy,
    #[arg(long, help = "Don't label the month of the first column")]
    hide_first_label: bool,
}

impl From<GridArgs> for GridOptions {
    fn from(
        GridArgs {
            weeks,
            week_start,
            intensity,
            hide_first_label,
        }: GridArgs,
    ) -> Self {
        GridOptions::default()
            .with_weeks(weeks)
            .with_week_start(week_start)
            .with_intensity(intensity)
            .with_suppressed_first_label(hide_first_label)
    }
}

pub fn render_options(no_color: bool) -> RenderOptions {
    RenderOptions {
        color: !no_color && std::io::stdout().is_terminal(),
    }
}

#[derive(Debug, clap::Args)]
pub struct HeatmapCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    grid: GridArgs,
    #[arg(long, help = "Print the computed report as json")]
    json: bool,
    #[arg(long, help = "Use plain characters instead of colors")]
    no_color: bool,
}

/// Command to process `heatmap` command. Reads the snapshot once and prints the report.
pub async fn process_heatmap_command(
    HeatmapCommand {
        source,
        grid,
        json,
        no_color,
    }: HeatmapCommand,
    app_dir: &Path,
) -> Result<()> {
    let evaluation_date = source.evaluation_date()?;
    let snapshot = source.snapshot_source(app_dir);
    let records = snapshot.fetch().await?;
    info!(
        "Loaded {} records from {:?}",
        records.len(),
        snapshot.path()
    );

    let report = analyze(&records, &grid.into(), evaluation_date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, &render_options(no_color)));
    }
    Ok(())
}

#[derive(Debug, clap::Args)]
pub struct StreakCommand {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, help = "Print the streak as json")]
    json: bool,
}

pub async fn process_streak_command(
    StreakCommand { source, json }: StreakCommand,
    app_dir: &Path,
) -> Result<()> {
    let evaluation_date = source.evaluation_date()?;
    let records = source.snapshot_source(app_dir).fetch().await?;
    let streak = analyze(&records, &GridOptions::default(), evaluation_date)?.streak;

    if json {
        println!("{}", serde_json::to_string_pretty(&streak)?);
        return Ok(());
    }

    println!("Current streak\t{}", days(streak.current_streak));
    println!("Longest streak\t{}", days(streak.longest_streak));
    match streak.last_active_date {
        Some(date) => println!("Last active\t{}", date_to_record_name(date)),
        None => println!("Last active\tnever"),
    }
    Ok(())
}

fn days(count: u32) -> String {
    if count == 1 {
        "1 day".into()
    } else {
        format!("{count} days")
    }
}
