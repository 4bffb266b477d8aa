use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Cycle time cell, color-coded by how long the issue took overall.
pub fn color_coded_cycle_time_cell(seconds: u64, words: &str) -> Cell {
    let days = seconds / 86_400;
    if days < 1 {
        Cell::new(words).fg(TableColor::Green)
    } else if days <= 5 {
        Cell::new(words).fg(TableColor::Yellow)
    } else {
        Cell::new(words).fg(TableColor::Red)
    }
}
