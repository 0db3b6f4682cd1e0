//! Terminal rendering of reports. Only presentation lives here, every value comes from
//! [crate::activity] and [crate::progress].

use std::fmt::Write;

use ansi_term::Colour;

use crate::{
    activity::{
        grid::{ActivityCalendar, CalendarCell, DAYS_IN_WEEK},
        intensity::MAX_LEVEL,
        ActivityReport,
    },
    progress::{ProjectProgress, TodoBreakdown},
    utils::time::date_to_record_name,
};

const LEVEL_GLYPHS: [char; MAX_LEVEL as usize + 1] = ['·', '░', '▒', '▓', '█'];
const LEVEL_COLOURS: [u8; MAX_LEVEL as usize + 1] = [237, 22, 28, 34, 40];
const ROW_LABEL_WIDTH: usize = 5;
const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
}

pub fn render_report(report: &ActivityReport, options: &RenderOptions) -> String {
    let mut out = String::new();
    let calendar = &report.calendar;

    let _ = writeln!(
        out,
        "Activity Overview  {} in the last {} weeks",
        pluralize(report.total, "activity", "activities"),
        calendar.weeks.len()
    );
    out.push_str(&render_calendar(calendar, options));

    let streak = &report.streak;
    let _ = write!(
        out,
        "Day streak: {} (longest {}",
        streak.current_streak, streak.longest_streak
    );
    match streak.last_active_date {
        Some(date) => {
            let _ = writeln!(out, ", last active {})", date_to_record_name(date));
        }
        None => out.push_str(")\n"),
    }
    out
}

/// Month labels, one line per weekday and the legend.
pub fn render_calendar(calendar: &ActivityCalendar, options: &RenderOptions) -> String {
    let mut out = String::new();

    // Labels of the last columns may run past the grid.
    let longest_label = calendar.month_labels.iter().map(|l| l.label.len()).max().unwrap_or(0);
    let mut months = vec![' '; calendar.weeks.len() * 2 + longest_label];
    let mut next_free = 0;
    for label in &calendar.month_labels {
        let position = label.week_index * 2;
        // Labels of columns too close to each other would overlap, the first one wins.
        if position < next_free {
            continue;
        }
        for (offset, c) in label.label.chars().enumerate() {
            months[position + offset] = c;
        }
        next_free = position + label.label.len() + 1;
    }
    let _ = writeln!(
        out,
        "{:width$}{}",
        "",
        months.into_iter().collect::<String>().trim_end(),
        width = ROW_LABEL_WIDTH
    );

    let row_labels = calendar.week_start.row_labels();
    for row in 0..DAYS_IN_WEEK {
        let _ = write!(out, "{:width$}", row_labels[row], width = ROW_LABEL_WIDTH);
        let line = calendar
            .weeks
            .iter()
            .map(|week| render_cell(&week[row], options))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let legend = (0..=MAX_LEVEL)
        .map(|level| render_level(level, options))
        .collect::<String>();
    let _ = writeln!(out, "Less {legend} More");
    out
}

fn render_cell(cell: &CalendarCell, options: &RenderOptions) -> String {
    if cell.is_future {
        " ".to_string()
    } else {
        render_level(cell.intensity, options)
    }
}

fn render_level(level: u8, options: &RenderOptions) -> String {
    let level = level.min(MAX_LEVEL) as usize;
    if options.color {
        Colour::Fixed(LEVEL_COLOURS[level]).paint("■").to_string()
    } else {
        LEVEL_GLYPHS[level].to_string()
    }
}

pub fn render_progress(todos: &TodoBreakdown, projects: &[ProjectProgress]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Todo Status");
    if todos.completed + todos.pending == 0 {
        let _ = writeln!(out, "  No todos yet");
    } else {
        let _ = writeln!(out, "  Completed  {}", todos.completed);
        let _ = writeln!(out, "  Pending    {}", todos.pending);
        if let Some(rate) = todos.completion_rate {
            let _ = writeln!(out, "  Completion {rate}");
        }
    }

    let _ = writeln!(out, "Project Progress");
    if projects.is_empty() {
        let _ = writeln!(out, "  No projects yet");
    }
    let name_width = projects.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    for project in projects {
        let filled = ((*project.progress / 100.) * PROGRESS_BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(PROGRESS_BAR_WIDTH);
        let _ = writeln!(
            out,
            "  {:name_width$}  [{}{}] {}  {}/{} done",
            project.name,
            "█".repeat(filled),
            " ".repeat(PROGRESS_BAR_WIDTH - filled),
            project.progress,
            project.completed,
            project.tasks,
        );
    }
    out
}

fn pluralize(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}
