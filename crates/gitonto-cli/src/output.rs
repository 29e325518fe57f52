//! Output formatting utilities

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!("Unknown output format '{}', using table", s);
            Self::Table
        })
    }
}

/// A record that can be laid out as a table or CSV row
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Format rows based on format type
pub fn format_output<T: Serialize + Tabular>(rows: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string()),
        OutputFormat::Csv => to_csv(rows),
        OutputFormat::Table => to_table(rows),
    }
}

fn to_csv<T: Tabular>(rows: &[T]) -> String {
    let mut output = T::headers().join(",");
    output.push('\n');
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| csv_escape(c)).collect();
        output.push_str(&cells.join(","));
        output.push('\n');
    }
    output
}

/// Longest cell shown in table output
const MAX_CELL_WIDTH: usize = 60;

fn to_table<T: Tabular>(rows: &[T]) -> String {
    let headers = T::headers();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells().into_iter().map(|c| table_cell(&c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = table_line(headers.iter().copied(), &widths);
    output.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("  "));
    output.push('\n');
    for cells in &body {
        output.push_str(&table_line(cells.iter().map(String::as_str), &widths));
        output.push('\n');
    }
    output
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// First line only, shortened to fit a column
fn table_cell(s: &str) -> String {
    let first = s.lines().next().unwrap_or("");
    if first.chars().count() > MAX_CELL_WIDTH {
        let cut: String = first.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        first.to_string()
    }
}

/// Escape a string for CSV output with formula injection protection
fn csv_escape(s: &str) -> String {
    // Prefix dangerous chars with ' to prevent spreadsheet interpretation
    let needs_formula_protection = s
        .chars()
        .next()
        .map(|c| matches!(c, '=' | '+' | '-' | '@' | '\t' | '\r'))
        .unwrap_or(false);

    let escaped = if needs_formula_protection {
        format!("'{}", s)
    } else {
        s.to_string()
    };

    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped.replace('"', "\"\""))
    } else {
        escaped
    }
}
