use anyhow::Result;
use cadence_core::reschedule::remove_recurrence;
use cadence_core::store::TaskStore;
use dialoguer::Confirm;

use super::Context;
use crate::cli::UncurCommand;
use crate::util::resolve_task;

pub fn uncur_task(store: &mut impl TaskStore, ctx: &Context, command: UncurCommand) -> Result<()> {
    let today = ctx.today();
    let mut task = resolve_task(store, &command.id)?;
    if !task.record.is_series_template() {
        println!("'{}' is not recurring.", task.display_name());
        return Ok(());
    }

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Stop '{}' from recurring? Occurrences after {} are dropped and this cannot be undone.",
                task.display_name(),
                today
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Cancelled.");
            return Ok(());
        }
    }

    remove_recurrence(&mut task.record, today);
    store.save(&task)?;
    println!("'{}' is now a one-time task scheduled for {}", task.display_name(), today);
    Ok(())
}
