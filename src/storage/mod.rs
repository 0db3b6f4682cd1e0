//!  Snapshots are exported from the backend into the application directory.
//!  The basic idea is:
//!   - `activity.jsonl` holds the activity records of the user, one `{date, count}` per line or
//!     a json array of them.
//!   - `todos.json` and `projects.json` hold the lists the progress charts are built from.
//!   - Files are read whole every time. Illegal entries are skipped, never fatal.

pub mod snapshot;

use std::path::{Path, PathBuf};

pub const ACTIVITY_FILE: &str = "activity.jsonl";
pub const TODOS_FILE: &str = "todos.json";
pub const PROJECTS_FILE: &str = "projects.json";

pub fn activity_path(app_dir: &Path) -> PathBuf {
    app_dir.join(ACTIVITY_FILE)
}

pub fn todos_path(app_dir: &Path) -> PathBuf {
    app_dir.join(TODOS_FILE)
}

pub fn projects_path(app_dir: &Path) -> PathBuf {
    app_dir.join(PROJECTS_FILE)
}
