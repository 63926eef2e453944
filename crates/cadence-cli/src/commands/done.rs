use anyhow::Result;
use cadence_core::models::TaskStatus;
use cadence_core::store::TaskStore;
use cadence_core::tracker::{self, CompletionResult};

use super::Context;
use crate::cli::{DoneCommand, ReopenCommand};
use crate::parser::parse_optional_date;
use crate::util::resolve_task;

pub fn done_task(store: &mut impl TaskStore, ctx: &Context, command: DoneCommand) -> Result<()> {
    let mut task = resolve_task(store, &command.id)?;
    let date = parse_optional_date(command.date.as_deref(), ctx.today())?;

    let result = tracker::complete(&mut task.record, date)?;
    store.save(&task)?;

    match result {
        CompletionResult::Task => {
            println!("Completed task: '{}'", task.display_name());
        }
        CompletionResult::Instance { original, effective } if original != effective => {
            println!(
                "Completed '{}' for {} (moved to {})",
                task.display_name(),
                original,
                effective
            );
        }
        CompletionResult::Instance { original, .. } => {
            println!("Completed '{}' for {}", task.display_name(), original);
        }
    }
    Ok(())
}

/// Reopens a completed or skipped occurrence, or a done plain task.
pub fn reopen_task(store: &mut impl TaskStore, ctx: &Context, command: ReopenCommand) -> Result<()> {
    let mut task = resolve_task(store, &command.id)?;

    match parse_optional_date(command.date.as_deref(), ctx.today())? {
        Some(original) => {
            let reopened = tracker::reopen_instance(&mut task.record, original)?;
            let unskipped = tracker::unskip_instance(&mut task.record, original)?;
            if !reopened && !unskipped {
                println!("'{}' for {} is already open", task.display_name(), original);
                return Ok(());
            }
            store.save(&task)?;
            println!("Reopened '{}' for {}", task.display_name(), original);
        }
        None => {
            task.record.set_status(TaskStatus::Open);
            store.save(&task)?;
            println!("Reopened task: '{}'", task.display_name());
        }
    }
    Ok(())
}
