use anyhow::{anyhow, Result};
use cadence_core::models::EditScope;
use cadence_core::reschedule::{self, RescheduleOutcome};
use cadence_core::store::TaskStore;

use super::Context;
use crate::cli::MoveCommand;
use crate::parser::{parse_date, parse_optional_date};
use crate::util::resolve_task;

pub fn move_task(store: &mut impl TaskStore, ctx: &Context, command: MoveCommand) -> Result<()> {
    let today = ctx.today();
    let mut task = resolve_task(store, &command.id)?;
    let original = parse_optional_date(command.date.as_deref(), today)?;

    if command.clear {
        let original = original.ok_or_else(|| anyhow!("--clear needs --date"))?;
        match reschedule::clear_instance_reschedule(&mut task.record, original) {
            Some(moved_to) => {
                store.save(&task)?;
                println!(
                    "'{}' for {} is back on its own day (was {})",
                    task.display_name(),
                    original,
                    moved_to
                );
            }
            None => println!("'{}' for {} was not moved", task.display_name(), original),
        }
        return Ok(());
    }

    let to = command
        .to
        .as_deref()
        .ok_or_else(|| anyhow!("--to is required"))?;
    let new_date = parse_date(to, today)?;
    let scope = match original {
        Some(date) => EditScope::ThisOccurrence(date),
        None => EditScope::EntireSeries,
    };

    match reschedule::reschedule(&mut task.record, scope, new_date)? {
        RescheduleOutcome::SeriesMoved { from: Some(from), to } => {
            println!("Moved '{}' from {} to {}", task.display_name(), from, to);
        }
        RescheduleOutcome::SeriesMoved { from: None, to } => {
            println!("Scheduled '{}' for {}", task.display_name(), to);
        }
        RescheduleOutcome::InstanceMoved { original, to, .. } => {
            println!("Moved '{}' for {} to {}", task.display_name(), original, to);
        }
    }
    store.save(&task)?;
    Ok(())
}
