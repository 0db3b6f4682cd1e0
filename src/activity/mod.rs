//! Activity aggregation and streak engine.
//!
//! Every function here is pure: a report is rebuilt from the full snapshot of records each time
//! the snapshot changes. Nothing is cached between calls, so the same input always produces the
//! same report.

pub mod entities;
pub mod grid;
pub mod intensity;
pub mod streak;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use crate::error::EngineResult;

use entities::{aggregate_totals, ActivityRecord};
use grid::{build_grid_from_totals, ActivityCalendar, GridOptions};
use streak::{streak_state, StreakState};

/// Everything the dashboard derives from one snapshot of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub calendar: ActivityCalendar,
    pub streak: StreakState,
    /// Activity inside the calendar range.
    pub total: u64,
    pub active_days: usize,
}

/// Runs the whole pipeline for a snapshot of records.
#[instrument(skip(records), fields(records = records.len()))]
pub fn analyze(
    records: &[ActivityRecord],
    options: &GridOptions,
    evaluation_date: NaiveDate,
) -> EngineResult<ActivityReport> {
    let totals = aggregate_totals(records);
    let calendar = build_grid_from_totals(&totals, options, evaluation_date)?;
    let streak = streak_state(&totals, evaluation_date);

    Ok(ActivityReport {
        total: calendar.total(),
        active_days: calendar.active_days(),
        calendar,
        streak,
    })
}
