use anyhow::{anyhow, Result};
use cadence_core::generator;
use cadence_core::store::TaskStore;
use owo_colors::OwoColorize;

use super::Context;
use crate::cli::PreviewCommand;
use crate::util::resolve_task;
use crate::views::table::{display_occurrences, OccurrenceState};

pub fn preview(store: &impl TaskStore, ctx: &Context, command: PreviewCommand) -> Result<()> {
    let task = resolve_task(store, &command.id)?;
    let today = ctx.today();
    let rule = task
        .record
        .rule(ctx.config.decode_mode(), today)?
        .ok_or_else(|| anyhow!("'{}' is not a recurring task", task.display_name()))?;

    println!("{}", task.display_name().cyan().bold());
    println!("Repeats: {}", rule.to_string().green());
    if let Some(encoded) = &task.record.recurrence {
        println!("Rule: {}", encoded.dimmed());
    }
    println!();

    let count = command.count.unwrap_or(ctx.config.preview_count);
    let instances = &task.record.instances;
    let occurrences: Vec<_> = generator::preview(&rule, today, count)
        .into_iter()
        .map(|date| {
            let state = if instances.complete_instances.contains(&date) {
                OccurrenceState::Done
            } else if instances.skipped_instances.contains(&date) {
                OccurrenceState::Skipped
            } else if let Some(to) = instances.rescheduled_instances.get(&date) {
                OccurrenceState::Moved(*to)
            } else if instances.active_instances.contains(&date) {
                OccurrenceState::Open
            } else {
                OccurrenceState::Pending
            };
            (date, state)
        })
        .collect();

    display_occurrences(&occurrences, today);
    Ok(())
}
