use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("YAML error")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid task record: {0}")]
    Parse(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRRule(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not an active occurrence of this series")]
    NotAnOccurrence(NaiveDate),

    #[error("Task is not recurring")]
    NotRecurring,

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Ambiguous task name. Did you mean one of these?")]
    AmbiguousKey(Vec<String>),
}
