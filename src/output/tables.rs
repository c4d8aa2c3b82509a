use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::providers::gitlab::Status;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn status_color(status: &Status) -> TableColor {
    match status {
        Status::Success => TableColor::Green,
        Status::Failed => TableColor::Red,
        Status::Running | Status::Pending | Status::Preparing | Status::WaitingForResource => {
            TableColor::Blue
        }
        Status::Manual | Status::Scheduled => TableColor::Magenta,
        Status::Canceled | Status::Canceling => TableColor::Yellow,
        Status::Created | Status::Skipped | Status::Unknown(_) => TableColor::Grey,
    }
}

pub fn status_cell(status: &Status) -> Cell {
    Cell::new(status.as_str()).fg(status_color(status))
}

pub fn duration_cell(seconds: Option<f64>) -> Cell {
    match seconds {
        Some(seconds) if seconds >= 60.0 => Cell::new(format!("{:.1}min", seconds / 60.0)),
        Some(seconds) => Cell::new(format!("{seconds:.0}s")),
        None => Cell::new("-"),
    }
}
