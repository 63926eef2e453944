use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::store::{StoredTask, TaskStore};

use crate::vault::stem;

/// Finds a task by file name: an exact key or stem wins, otherwise a
/// unique case-insensitive stem prefix.
pub fn resolve_task(store: &impl TaskStore, name: &str) -> Result<StoredTask> {
    if name.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Task name must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = store.load_all()?.tasks;
    pick(tasks, name)
}

fn pick(tasks: Vec<StoredTask>, name: &str) -> Result<StoredTask> {
    if let Some(exact) = tasks.iter().find(|t| t.key == name || stem(&t.key) == name) {
        return Ok(exact.clone());
    }

    let prefix = name.to_lowercase();
    let mut matches: Vec<StoredTask> = tasks
        .into_iter()
        .filter(|t| stem(&t.key).to_lowercase().starts_with(&prefix))
        .collect();

    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found matching '{}'",
            name
        ))))
    } else {
        let keys = matches.into_iter().map(|t| t.key).collect();
        Err(anyhow!(CoreError::AmbiguousKey(keys)))
    }
}
