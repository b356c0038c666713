use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    data::format_cell,
    engine::{Page, Snapshot},
    schema::Schema,
};

pub const NO_DATA_MESSAGE: &str = "No data loaded.";
pub const NO_RESULTS_MESSAGE: &str = "No result matches your search!";
const COLUMN_GAP: &str = "  ";

fn visible_width(value: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in value.chars() {
        match (in_escape, ch) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

fn flatten(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

fn pad(value: &str, width: usize) -> String {
    let padding = width.saturating_sub(visible_width(value));
    format!("{value}{}", " ".repeat(padding))
}

fn grid_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

/// Renders `headers` over `rows` with a dashed separator line.
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| flatten(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| flatten(cell)).collect())
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| visible_width(h).max(1)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", grid_line(&headers, &widths));
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
    let dash_widths: Vec<usize> = widths.iter().map(|w| (*w).max(3)).collect();
    let _ = writeln!(output, "{}", grid_line(&dashes, &dash_widths));
    for row in &rows {
        let _ = writeln!(output, "{}", grid_line(row, &widths));
    }
    output
}

/// Position, raw name and label of every column.
pub fn render_columns(schema: &Schema) -> String {
    let headers = vec!["#".to_string(), "name".to_string(), "label".to_string()];
    let rows: Vec<Vec<String>> = schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.label.clone(),
            ]
        })
        .collect();
    render_grid(&headers, &rows)
}

pub fn render_snapshot(snapshot: &Snapshot<'_>) -> String {
    let rows: Vec<Vec<String>> = match &snapshot.page {
        Page::NotLoaded => return format!("{NO_DATA_MESSAGE}\n"),
        Page::NoResults => Vec::new(),
        Page::Rows(rows) => rows
            .iter()
            .map(|row| {
                (0..snapshot.columns.len())
                    .map(|idx| format_cell(row.cell(idx)))
                    .collect()
            })
            .collect(),
    };
    let headers: Vec<String> = snapshot
        .columns
        .iter()
        .map(|column| match column.direction.indicator() {
            "" => column.label.to_string(),
            arrow => format!("{} {arrow}", column.label),
        })
        .collect();

    let mut output = render_grid(&headers, &rows);
    if matches!(snapshot.page, Page::NoResults) {
        let _ = writeln!(output, "{NO_RESULTS_MESSAGE}");
        return output;
    }

    let meta = &snapshot.metadata;
    let _ = writeln!(output, "{}", meta.summary());
    let mut nav = Vec::with_capacity(3);
    if meta.has_previous {
        nav.push("< Previous".to_string());
    }
    nav.push(meta.position());
    if meta.has_next {
        nav.push("Next >".to_string());
    }
    let _ = writeln!(output, "{}", nav.join("  "));
    output
}
