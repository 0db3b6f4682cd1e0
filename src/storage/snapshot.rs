use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use serde::de::DeserializeOwned;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, warn};

use crate::activity::entities::ActivityRecord;

/// Anything able to hand out the current snapshot of activity records. The engine doesn't care
/// where the snapshot comes from, it only needs the whole of it every time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ActivityRecord>>;
}

/// Snapshot exported into a file, either as a json array or one json object per line.
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn fetch(&self) -> Result<Vec<ActivityRecord>> {
        load_json_list(&self.path).await
    }
}

/// Reads a list of entries from `path`. A missing file is an empty list.
pub async fn load_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match read_locked(path).await {
        Ok(content) => Ok(parse_entries(&content, path)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{path:?} doesn't exist yet");
            Ok(vec![])
        }
        Err(e) => Err(e)?,
    }
}

async fn read_locked(path: &Path) -> std::result::Result<String, std::io::Error> {
    debug!("Reading {path:?}");
    let mut file = File::open(path).await?;
    // The exporter might be rewriting the file at the same time.
    file.lock_shared()?;
    let mut content = String::new();
    let read = file.read_to_string(&mut content).await;
    file.unlock_async().await?;
    read?;
    Ok(content)
}

fn parse_entries<T: DeserializeOwned>(content: &str, path: &Path) -> Vec<T> {
    if content.trim_start().starts_with('[') {
        let values = match serde_json::from_str::<Vec<serde_json::Value>>(content) {
            Ok(v) => v,
            Err(e) => {
                warn!("File {path:?} is not a valid json array: {e}");
                return vec![];
            }
        };
        values
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<T>(v.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("In {path:?} found illegal entry {v}: {e}");
                    None
                }
            })
            .collect()
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<T>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    // ignore illegal values. Might happen when the export was cut off
                    warn!("In {path:?} found illegal json string {line}: {e}");
                    None
                }
            })
            .collect()
    }
}
