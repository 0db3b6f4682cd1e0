use std::{collections::BTreeMap, fmt::Display};

use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;
use tracing::{instrument, trace};

use crate::error::{EngineError, EngineResult};

use super::{
    entities::{aggregate_totals, ActivityRecord},
    intensity::IntensityPolicy,
};

pub const DAYS_IN_WEEK: usize = 7;
pub const DEFAULT_WEEKS: u32 = 52;

/// Which day opens a week column. Both conventions are in use, so it's always explicit.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Returns the first day of the week `date` belongs to. `None` only at the very start of
    /// the supported calendar.
    pub fn week_start_of(&self, date: NaiveDate) -> Option<NaiveDate> {
        let offset = match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        };
        date.checked_sub_days(Days::new(offset as u64))
    }

    /// Short names of the rows, top to bottom.
    pub fn row_labels(&self) -> [&'static str; DAYS_IN_WEEK] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Sunday => write!(f, "sunday"),
            WeekStart::Monday => write!(f, "monday"),
        }
    }
}

/// Shape of the calendar the builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridOptions {
    pub weeks: u32,
    pub week_start: WeekStart,
    /// Skips the label of the first column. Renderers that draw labels above the grid tend to
    /// clip it.
    pub suppress_first_label: bool,
    pub intensity: IntensityPolicy,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            weeks: DEFAULT_WEEKS,
            week_start: WeekStart::default(),
            suppress_first_label: false,
            intensity: IntensityPolicy::default(),
        }
    }
}

impl GridOptions {
    pub fn with_weeks(self, weeks: u32) -> Self {
        Self { weeks, ..self }
    }

    pub fn with_week_start(self, week_start: WeekStart) -> Self {
        Self { week_start, ..self }
    }

    pub fn with_intensity(self, intensity: IntensityPolicy) -> Self {
        Self { intensity, ..self }
    }

    pub fn with_suppressed_first_label(self, suppress_first_label: bool) -> Self {
        Self {
            suppress_first_label,
            ..self
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.weeks == 0 {
            return Err(EngineError::invalid_argument(
                "weeks should be a positive number",
            ));
        }
        if !self.intensity.is_ascending() {
            return Err(EngineError::invalid_argument(format!(
                "intensity thresholds {} should be ascending",
                self.intensity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub count: u64,
    pub intensity: u8,
    pub is_future: bool,
}

impl CalendarCell {
    /// Human readable description of the cell, e.g. `3 activities on Jan 5, 2024`.
    pub fn tooltip(&self) -> String {
        let activity = if self.count == 1 {
            "1 activity".to_string()
        } else {
            format!("{} activities", self.count)
        };
        format!("{activity} on {}", self.date.format("%b %-d, %Y"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub label: String,
    pub week_index: usize,
}

/// Column of the calendar. Rows follow [WeekStart::row_labels].
pub type CalendarWeek = [CalendarCell; DAYS_IN_WEEK];

/// Heatmap data for a range of weeks ending with the week of the evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCalendar {
    pub weeks: Vec<CalendarWeek>,
    pub month_labels: Vec<MonthLabel>,
    /// Biggest day total among the non future cells.
    pub max_count: u64,
    pub evaluation_date: NaiveDate,
    pub week_start: WeekStart,
}

impl ActivityCalendar {
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flatten()
    }

    /// Sum of all activity visible in the grid.
    pub fn total(&self) -> u64 {
        self.cells().fold(0u64, |acc, c| acc.saturating_add(c.count))
    }

    pub fn active_days(&self) -> usize {
        self.cells().filter(|c| c.count > 0).count()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.weeks.first().map(|w| w[0].date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.weeks.last().map(|w| w[DAYS_IN_WEEK - 1].date)
    }
}

/// Builds the heatmap grid for `records`.
///
/// The last column is the week containing `evaluation_date`, the grid extends `options.weeks`
/// columns back from it. Cells after `evaluation_date` are flagged as future and always carry
/// zero activity.
#[instrument(skip(records), fields(records = records.len()))]
pub fn build_grid(
    records: &[ActivityRecord],
    options: &GridOptions,
    evaluation_date: NaiveDate,
) -> EngineResult<ActivityCalendar> {
    let totals = aggregate_totals(records);
    build_grid_from_totals(&totals, options, evaluation_date)
}

pub(crate) fn build_grid_from_totals(
    totals: &BTreeMap<NaiveDate, u64>,
    options: &GridOptions,
    evaluation_date: NaiveDate,
) -> EngineResult<ActivityCalendar> {
    options.validate()?;

    let grid_end = options
        .week_start
        .week_start_of(evaluation_date)
        .ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "week of {evaluation_date} is out of the supported calendar"
            ))
        })?;
    let grid_start = grid_end
        .checked_sub_days(Days::new((options.weeks as u64 - 1) * DAYS_IN_WEEK as u64))
        .ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "{} weeks before {evaluation_date} is out of the supported calendar",
                options.weeks
            ))
        })?;
    // The last cell has to exist as well, the week might run past the end of the calendar.
    grid_end
        .checked_add_days(Days::new(DAYS_IN_WEEK as u64 - 1))
        .ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "week of {evaluation_date} is out of the supported calendar"
            ))
        })?;
    trace!("Grid spans {grid_start} {grid_end}");

    let mut weeks = Vec::with_capacity(options.weeks as usize);
    let mut month_labels = vec![];
    let mut last_month: Option<(i32, u32)> = None;
    let mut max_count = 0;

    for week_index in 0..options.weeks as usize {
        let column_start = grid_start + Days::new((week_index * DAYS_IN_WEEK) as u64);
        let month = (column_start.year(), column_start.month());
        if last_month != Some(month) {
            if !(week_index == 0 && options.suppress_first_label) {
                month_labels.push(MonthLabel {
                    label: column_start.format("%b").to_string(),
                    week_index,
                });
            }
            last_month = Some(month);
        }

        let week: [(NaiveDate, u64, bool); DAYS_IN_WEEK] = std::array::from_fn(|row| {
            let date = column_start + Days::new(row as u64);
            let is_future = date > evaluation_date;
            let count = if is_future {
                0
            } else {
                totals.get(&date).copied().unwrap_or(0)
            };
            (date, count, is_future)
        });
        max_count = week.iter().map(|v| v.1).fold(max_count, u64::max);
        weeks.push(week);
    }

    // Levels depend on the maximum, so they're assigned once every column is known.
    let weeks = weeks
        .into_iter()
        .map(|week| {
            week.map(|(date, count, is_future)| CalendarCell {
                date,
                count,
                intensity: options.intensity.classify(count, max_count),
                is_future,
            })
        })
        .collect();

    Ok(ActivityCalendar {
        weeks,
        month_labels,
        max_count,
        evaluation_date,
        week_start: options.week_start,
    })
}
