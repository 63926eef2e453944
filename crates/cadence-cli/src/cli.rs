use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Recurring tasks and attention groups over a folder of markdown notes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the task files (overrides the config file)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Pretend today is this date (e.g. '2026-02-05', 'next friday')
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Reject recurrence rules that would otherwise be read with fallbacks
    #[arg(long, global = true)]
    pub strict: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show tasks grouped into Now, Past, Upcoming and Wrapped
    List(ListCommand),
    /// Activate today's occurrences of every recurring task
    Materialize,
    /// Show the rule and next occurrences of a recurring task
    Preview(PreviewCommand),
    /// Mark a task, or one occurrence of a recurring task, as done
    Done(DoneCommand),
    /// Skip one occurrence of a recurring task
    Skip(SkipCommand),
    /// Undo a completion or skip
    Reopen(ReopenCommand),
    /// Reschedule a task, or one occurrence of a recurring task
    Move(MoveCommand),
    /// Make a task recurring
    Recur(RecurCommand),
    /// Stop a task from recurring
    Uncur(UncurCommand),
    /// Keep running and activate occurrences whenever the day changes
    Watch(WatchCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Also show wrapped (done, skipped, undated) tasks
    #[clap(short, long)]
    pub all: bool,
    /// Do not activate today's occurrences before listing
    #[clap(long)]
    pub no_materialize: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Task file name or prefix
    pub id: String,
    /// Number of occurrences to show
    #[clap(long, short)]
    pub count: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// Task file name or prefix
    pub id: String,
    /// Original date of the occurrence to complete (default: the oldest open one)
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipCommand {
    /// Task file name or prefix
    pub id: String,
    /// Original date of the occurrence to skip
    #[clap(long)]
    pub date: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ReopenCommand {
    /// Task file name or prefix
    pub id: String,
    /// Original date of the occurrence to reopen
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct MoveCommand {
    /// Task file name or prefix
    pub id: String,
    /// New date
    #[clap(long, required_unless_present = "clear")]
    pub to: Option<String>,
    /// Original date of the single occurrence to move; without it the
    /// task's own scheduled date moves
    #[clap(long)]
    pub date: Option<String>,
    /// Put the occurrence given by --date back on its original day
    #[clap(long, requires = "date", conflicts_with = "to")]
    pub clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurCommand {
    /// Task file name or prefix
    pub id: String,
    /// Human-friendly recurrence frequency
    #[clap(long, value_enum)]
    pub every: RecurrenceShortcut,
    /// Repeat every N days/weeks/months/years
    #[clap(long, default_value = "1")]
    pub interval: u32,
    /// Days of week for weekly recurrence (e.g. 'mon,wed,fri')
    #[clap(long)]
    pub on: Option<String>,
    /// Day of month for monthly recurrence
    #[clap(long, conflicts_with = "nth")]
    pub day: Option<u32>,
    /// Which weekday of the month (1-5, or -1 for the last)
    #[clap(long, allow_hyphen_values = true, requires = "weekday")]
    pub nth: Option<i32>,
    /// Weekday used with --nth
    #[clap(long, requires = "nth")]
    pub weekday: Option<String>,
    /// First day of the series (default: the task's scheduled date, or today)
    #[clap(long)]
    pub start: Option<String>,
    /// Last possible day of the series
    #[clap(long)]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UncurCommand {
    /// Task file name or prefix
    pub id: String,
    /// Skip the confirmation prompt
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct WatchCommand {
    /// How often to check whether the day has changed
    #[clap(long, default_value = "60")]
    pub poll_secs: u64,
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceShortcut {
    /// Every day
    Daily,
    /// Every week (same day, or the days given with --on)
    Weekly,
    /// Every month (same date, --day, or --nth --weekday)
    Monthly,
    /// Every year (same date)
    Yearly,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl std::fmt::Display for RecurrenceShortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceShortcut::Daily => write!(f, "daily"),
            RecurrenceShortcut::Weekly => write!(f, "weekly"),
            RecurrenceShortcut::Monthly => write!(f, "monthly"),
            RecurrenceShortcut::Yearly => write!(f, "yearly"),
            RecurrenceShortcut::Weekdays => write!(f, "weekdays"),
            RecurrenceShortcut::Weekends => write!(f, "weekends"),
        }
    }
}
