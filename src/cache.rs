//! Last known results and progress per analysis task, used when the backend
//! cannot be reached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::client::AnalysisProgress;
use crate::normalize::NormalizedResult;

pub trait ResultCache: Send + Sync {
    fn get_results(&self, task_id: &str) -> Option<NormalizedResult>;
    fn set_results(&self, task_id: &str, result: &NormalizedResult);
    fn get_progress(&self, task_id: &str) -> Option<AnalysisProgress>;
    fn set_progress(&self, task_id: &str, progress: &AnalysisProgress);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    results: Mutex<HashMap<String, NormalizedResult>>,
    progress: Mutex<HashMap<String, AnalysisProgress>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCache for MemoryCache {
    fn get_results(&self, task_id: &str) -> Option<NormalizedResult> {
        let results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.get(task_id).cloned()
    }

    fn set_results(&self, task_id: &str, result: &NormalizedResult) {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.insert(task_id.to_string(), result.clone());
    }

    fn get_progress(&self, task_id: &str) -> Option<AnalysisProgress> {
        let progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        progress.get(task_id).cloned()
    }

    fn set_progress(&self, task_id: &str, progress: &AnalysisProgress) {
        let mut entries = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(task_id.to_string(), progress.clone());
    }
}

/// One JSON file per task and kind under `dir`. Writes are best effort; a
/// cache that cannot be written only costs the offline fallback.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_location() -> miette::Result<Self> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| miette::miette!("Failed to get cache directory"))?
            .join("intake");

        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, kind: &str, task_id: &str) -> PathBuf {
        self.dir
            .join(format!("{kind}_{}.json", sanitize_task_id(task_id)))
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, task_id: &str) -> Option<T> {
        let path = self.path_for(kind, task_id);
        let content = std::fs::read_to_string(&path).ok()?;

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable cache entry");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, kind: &str, task_id: &str, value: &T) {
        let path = self.path_for(kind, task_id);

        let outcome = std::fs::create_dir_all(&self.dir)
            .map_err(|error| error.to_string())
            .and_then(|_| serde_json::to_string(value).map_err(|error| error.to_string()))
            .and_then(|content| std::fs::write(&path, content).map_err(|error| error.to_string()));

        match outcome {
            Ok(()) => debug!(path = %path.display(), "cache entry written"),
            Err(error) => warn!(path = %path.display(), %error, "failed to write cache entry"),
        }
    }
}

impl ResultCache for FileCache {
    fn get_results(&self, task_id: &str) -> Option<NormalizedResult> {
        self.read("results", task_id)
    }

    fn set_results(&self, task_id: &str, result: &NormalizedResult) {
        self.write("results", task_id, result)
    }

    fn get_progress(&self, task_id: &str) -> Option<AnalysisProgress> {
        self.read("progress", task_id)
    }

    fn set_progress(&self, task_id: &str, progress: &AnalysisProgress) {
        self.write("progress", task_id, progress)
    }
}

// task ids come from the backend, keep them from escaping the cache dir
fn sanitize_task_id(task_id: &str) -> String {
    task_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
