use cadence_core::tracker::MaterializationManager;
use chrono::{Local, NaiveDate};

use crate::config::Config;

pub mod done;
pub mod list;
pub mod materialize;
pub mod preview;
pub mod recur;
pub mod reschedule;
pub mod skip;
pub mod uncur;
pub mod watch;

/// Everything a command needs besides the store.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub manager: MaterializationManager,
    today: NaiveDate,
    /// Set when `--today` pinned the date
    pinned: bool,
}

impl Context {
    pub fn new(config: Config, today: Option<NaiveDate>) -> Self {
        let manager = MaterializationManager::new(config.materialization_config());
        Self {
            config,
            manager,
            today: today.unwrap_or_else(|| Local::now().date_naive()),
            pinned: today.is_some(),
        }
    }

    /// The date the command was started on (or the pinned date).
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The local date right now, unless pinned.
    pub fn current_day(&self) -> NaiveDate {
        if self.pinned {
            self.today
        } else {
            Local::now().date_naive()
        }
    }
}
