//! Todo and project statistics shown next to the heatmap.

use serde::{Deserialize, Serialize};

use crate::utils::percentage::{ratio_percentage, Percentage};

/// Number of projects the progress chart shows by default.
pub const DEFAULT_PROJECT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(alias = "text")]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub tasks: u32,
    #[serde(default)]
    pub completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TodoBreakdown {
    pub completed: usize,
    pub pending: usize,
    /// `None` when there are no todos at all.
    pub completion_rate: Option<Percentage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectProgress {
    pub name: String,
    pub progress: Percentage,
    pub tasks: u32,
    pub completed: u32,
}

pub fn todo_breakdown(todos: &[Todo]) -> TodoBreakdown {
    let completed = todos.iter().filter(|t| t.completed).count();
    TodoBreakdown {
        completed,
        pending: todos.len() - completed,
        completion_rate: ratio_percentage(completed, todos.len()),
    }
}

/// Chart entries for the first `limit` projects, in the order they were given.
pub fn project_chart(projects: &[Project], limit: usize) -> Vec<ProjectProgress> {
    projects
        .iter()
        .take(limit)
        .map(|p| ProjectProgress {
            name: p.name.clone(),
            progress: Percentage::clamped(p.progress),
            tasks: p.tasks,
            completed: p.completed,
        })
        .collect()
}
