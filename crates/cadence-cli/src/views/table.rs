use cadence_core::classifier::{AttentionBoard, AttentionRow};
use cadence_core::models::AttentionGroup;
use cadence_core::store::StoredTask;
use chrono::NaiveDate;
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use owo_colors::OwoColorize;

use crate::vault::stem;

fn group_color(group: AttentionGroup) -> Color {
    match group {
        AttentionGroup::Now => Color::Yellow,
        AttentionGroup::Past => Color::Red,
        AttentionGroup::Upcoming => Color::Cyan,
        AttentionGroup::Wrapped => Color::DarkGrey,
    }
}

fn relative(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "today".to_string()
    } else {
        HumanTime::from(date - today).to_string()
    }
}

fn task_row(row: &AttentionRow<'_>, task: &StoredTask, today: NaiveDate) -> Row {
    let mut out = Row::new();
    out.add_cell(Cell::new(stem(&task.key)));

    let mut name = String::new();
    if row.record.is_series_template() {
        name.push_str("↻ ");
    }
    name.push_str(task.display_name());
    let mut name_cell = Cell::new(name);
    if row.group == AttentionGroup::Wrapped {
        name_cell = name_cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey);
    }
    out.add_cell(name_cell);

    match row.effective_date {
        Some(date) => {
            out.add_cell(Cell::new(date.to_string()).fg(group_color(row.group)));
            out.add_cell(Cell::new(relative(date, today)));
        }
        None => {
            out.add_cell(Cell::new("None"));
            out.add_cell(Cell::new(""));
        }
    }

    let note = match (row.instance_date, row.effective_date) {
        (Some(original), Some(effective)) if original != effective => format!("moved from {}", original),
        _ => String::new(),
    };
    out.add_cell(Cell::new(note));
    out
}

/// Prints one table per non-empty attention group. `tasks` must be the
/// slice the board was built from.
pub fn display_board(board: &AttentionBoard<'_>, tasks: &[StoredTask], today: NaiveDate, show_wrapped: bool) {
    let mut shown = 0;
    for (group, rows) in board.iter() {
        if group == AttentionGroup::Wrapped && !show_wrapped {
            continue;
        }

        let heading = format!("{} ({})", group, rows.len());
        match group {
            AttentionGroup::Now => println!("{}", heading.yellow().bold()),
            AttentionGroup::Past => println!("{}", heading.red().bold()),
            AttentionGroup::Upcoming => println!("{}", heading.cyan().bold()),
            AttentionGroup::Wrapped => println!("{}", heading.dimmed()),
        }

        let mut table = Table::new();
        table.set_header(vec!["ID", "Name", "Date", "When", "Note"]);
        for row in rows {
            table.add_row(task_row(row, &tasks[row.index], today));
        }
        println!("{table}");
        println!();
        shown += rows.len();
    }

    if shown == 0 {
        println!("No tasks found.");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceState {
    /// Not activated yet
    Pending,
    Open,
    Done,
    Skipped,
    Moved(NaiveDate),
}

/// Upcoming occurrence dates with their current state.
pub fn display_occurrences(occurrences: &[(NaiveDate, OccurrenceState)], today: NaiveDate) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences (series may have ended)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Weekday", "When", "State"]);
    for (i, (date, state)) in occurrences.iter().enumerate() {
        let state_cell = match state {
            OccurrenceState::Pending => Cell::new(""),
            OccurrenceState::Open => Cell::new("open").fg(Color::Yellow),
            OccurrenceState::Done => Cell::new("done").fg(Color::Green),
            OccurrenceState::Skipped => Cell::new("skipped").fg(Color::DarkGrey),
            OccurrenceState::Moved(to) => Cell::new(format!("moved to {}", to)).fg(Color::Blue),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(date.to_string()),
            Cell::new(date.format("%a").to_string()),
            Cell::new(relative(*date, today)),
            state_cell,
        ]);
    }
    println!("{table}");
}
