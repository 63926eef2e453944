//! A directory of markdown task files as a [`TaskStore`].

use cadence_core::error::CoreError;
use cadence_core::record::TaskDocument;
use cadence_core::store::{LoadReport, StoredTask, TaskStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = "md";

/// Task files are every `*.md` below the root, hidden directories excluded.
/// Keys are paths relative to the root with `/` separators.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CoreError::NotFound(format!(
                "vault directory '{}'",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn task_files(&self) -> Result<Vec<PathBuf>, CoreError> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if hidden {
                    continue;
                }
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn key_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl TaskStore for VaultStore {
    fn load_all(&self) -> Result<LoadReport, CoreError> {
        let mut report = LoadReport::default();
        for path in self.task_files()? {
            let key = self.key_for(&path);
            let parsed = fs::read_to_string(&path)
                .map_err(CoreError::from)
                .and_then(|text| TaskDocument::parse(&text));
            match parsed {
                Ok(doc) => report.tasks.push(StoredTask::new(key, doc.record)),
                Err(e) => report.failures.push((key, e)),
            }
        }
        debug!(
            root = %self.root.display(),
            loaded = report.tasks.len(),
            failed = report.failures.len(),
            "vault loaded"
        );
        Ok(report)
    }

    /// Rewrites the frontmatter of an existing file, keeping its body.
    fn save(&mut self, task: &StoredTask) -> Result<(), CoreError> {
        let path = self.path_for(&task.key);
        if !path.is_file() {
            return Err(CoreError::NotFound(task.key.clone()));
        }
        let mut doc = TaskDocument::parse(&fs::read_to_string(&path)?)?;
        doc.record = task.record.clone();
        fs::write(&path, doc.render()?)?;
        debug!(key = %task.key, "task saved");
        Ok(())
    }
}

/// File name without directories or extension.
pub fn stem(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_suffix(".md").unwrap_or(name)
}
