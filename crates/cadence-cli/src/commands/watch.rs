use anyhow::Result;
use cadence_core::store::TaskStore;
use cadence_core::tracker::DayClock;
use std::time::Duration;
use tracing::{info, warn};

use super::materialize::print_summary;
use super::Context;
use crate::cli::WatchCommand;

/// Runs the daily pass at startup and again whenever the local date
/// changes, until Ctrl-C.
pub async fn watch(store: &mut impl TaskStore, ctx: &Context, command: WatchCommand) -> Result<()> {
    let mut clock = DayClock::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(command.poll_secs.max(1)));
    println!("Watching {} (Ctrl-C to stop)", ctx.config.vault.display());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = ctx.current_day();
                if clock.tick(today) {
                    info!(%today, "new day, materializing");
                    match ctx.manager.materialize_store(store, today) {
                        Ok(summary) => {
                            print!("{}: ", today);
                            print_summary(&summary);
                            if summary.save_failures > 0 {
                                warn!(%today, failed = summary.save_failures, "some series were not saved, will retry");
                                clock.reset();
                            }
                        }
                        Err(e) => {
                            warn!(%today, error = %e, "materialization failed, will retry");
                            clock.reset();
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                break;
            }
        }
    }
    Ok(())
}
