use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::record::TaskRecord;

/// A record together with the key its store knows it by (a file path,
/// a row id, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTask {
    pub key: String,
    pub record: TaskRecord,
}

impl StoredTask {
    pub fn new(key: impl Into<String>, record: TaskRecord) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }

    /// Title, or the key when the record has none.
    pub fn display_name(&self) -> &str {
        self.record.title.as_deref().unwrap_or(&self.key)
    }
}

/// Outcome of loading a whole store. Records that failed to parse are
/// reported next to the ones that loaded rather than failing the load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub tasks: Vec<StoredTask>,
    pub failures: Vec<(String, CoreError)>,
}

/// Persistence collaborator. The engine never does I/O itself; whatever
/// owns the records implements this.
pub trait TaskStore {
    fn load_all(&self) -> Result<LoadReport, CoreError>;
    fn save(&mut self, task: &StoredTask) -> Result<(), CoreError>;
}

/// In-memory store, ordered by key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: BTreeMap<String, TaskRecord>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: StoredTask) {
        self.tasks.insert(task.key, task.record);
    }

    pub fn get(&self, key: &str) -> Option<StoredTask> {
        self.tasks
            .get(key)
            .map(|record| StoredTask::new(key, record.clone()))
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl TaskStore for MemoryStore {
    fn load_all(&self) -> Result<LoadReport, CoreError> {
        Ok(LoadReport {
            tasks: self
                .tasks
                .iter()
                .map(|(key, record)| StoredTask::new(key.clone(), record.clone()))
                .collect(),
            failures: Vec::new(),
        })
    }

    fn save(&mut self, task: &StoredTask) -> Result<(), CoreError> {
        if !self.tasks.contains_key(&task.key) {
            return Err(CoreError::NotFound(task.key.clone()));
        }
        self.tasks.insert(task.key.clone(), task.record.clone());
        self.saves += 1;
        Ok(())
    }
}
