use anyhow::Result;
use cadence_core::classifier::AttentionBoard;
use cadence_core::store::TaskStore;

use super::materialize::{print_summary, warn_unreadable};
use super::Context;
use crate::cli::ListCommand;
use crate::views::table::display_board;

pub fn list_tasks(store: &mut impl TaskStore, ctx: &Context, command: ListCommand) -> Result<()> {
    let today = ctx.today();
    // Unreadable records are reported once, by whichever step saw them first
    let materialized = !command.no_materialize;
    if materialized {
        let summary = ctx.manager.materialize_store(store, today)?;
        if summary.instances_created > 0 || !summary.errors.is_empty() {
            print_summary(&summary);
        } else {
            warn_unreadable(&summary.unreadable);
        }
    }

    let report = store.load_all()?;
    if !materialized {
        let failures: Vec<String> = report
            .failures
            .iter()
            .map(|(key, error)| format!("{}: {}", key, error))
            .collect();
        warn_unreadable(&failures);
    }

    let board = AttentionBoard::build(today, report.tasks.iter().map(|t| &t.record));
    display_board(&board, &report.tasks, today, command.all);
    Ok(())
}
