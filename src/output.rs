use crate::error::{ReportError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let csv_err = |source: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Render up to `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}
