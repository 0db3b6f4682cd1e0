use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::{
    progress::{
        project_chart, todo_breakdown, Project, ProjectProgress, Todo, TodoBreakdown,
        DEFAULT_PROJECT_LIMIT,
    },
    render::render_progress,
    storage::{projects_path, snapshot::load_json_list, todos_path},
};

#[derive(Debug, clap::Args)]
pub struct ProgressCommand {
    #[arg(long, help = "Todo list export. By default todos.json in the application directory")]
    todos: Option<PathBuf>,
    #[arg(
        long,
        help = "Project list export. By default projects.json in the application directory"
    )]
    projects: Option<PathBuf>,
    #[arg(short, long, default_value_t = DEFAULT_PROJECT_LIMIT, help = "Number of projects to show")]
    limit: usize,
    #[arg(long, help = "Print the statistics as json")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ProgressReport {
    todos: TodoBreakdown,
    projects: Vec<ProjectProgress>,
}

pub async fn process_progress_command(
    ProgressCommand {
        todos,
        projects,
        limit,
        json,
    }: ProgressCommand,
    app_dir: &Path,
) -> Result<()> {
    let todos: Vec<Todo> =
        load_json_list(&todos.unwrap_or_else(|| todos_path(app_dir))).await?;
    let projects: Vec<Project> =
        load_json_list(&projects.unwrap_or_else(|| projects_path(app_dir))).await?;

    let report = ProgressReport {
        todos: todo_breakdown(&todos),
        projects: project_chart(&projects, limit),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_progress(&report.todos, &report.projects));
    }
    Ok(())
}
