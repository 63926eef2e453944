use anyhow::Result;
use cadence_core::store::TaskStore;
use cadence_core::tracker::MaterializationSummary;
use owo_colors::OwoColorize;

use super::Context;

pub fn materialize(store: &mut impl TaskStore, ctx: &Context) -> Result<()> {
    let summary = ctx.manager.materialize_store(store, ctx.today())?;
    print_summary(&summary);
    Ok(())
}

pub fn print_summary(summary: &MaterializationSummary) {
    println!(
        "Activated {} occurrence(s) across {} recurring task(s)",
        summary.instances_created,
        summary.series_processed
    );
    for error in &summary.errors {
        eprintln!("  {} {}", "!".red(), error);
    }
    warn_unreadable(&summary.unreadable);
}

/// One line per record that could not be read, as `key: error`.
pub fn warn_unreadable(entries: &[String]) {
    for entry in entries {
        eprintln!("{} skipping {}", "Warning:".yellow().bold(), entry);
    }
}
