use anyhow::Result;
use cadence_core::store::TaskStore;
use cadence_core::tracker;

use super::Context;
use crate::cli::SkipCommand;
use crate::parser::parse_date;
use crate::util::resolve_task;

pub fn skip_occurrence(store: &mut impl TaskStore, ctx: &Context, command: SkipCommand) -> Result<()> {
    let mut task = resolve_task(store, &command.id)?;
    let original = parse_date(&command.date, ctx.today())?;

    if tracker::skip_instance(&mut task.record, original)? {
        store.save(&task)?;
        println!("Skipped '{}' for {}", task.display_name(), original);
    } else {
        println!("'{}' for {} was already skipped", task.display_name(), original);
    }
    Ok(())
}
