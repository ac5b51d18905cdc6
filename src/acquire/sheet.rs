use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{DataType, Reader, open_workbook_auto};

use crate::model::AcquiredDocument;

/// Spreadsheets are serialized to a column-aligned printable form and used as
/// fallback text only; no table cascade applies to them.
pub(super) fn acquire_sheet(sheet_path: &Path) -> Result<AcquiredDocument> {
    let extension = sheet_path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();

    let rows = if extension == "csv" {
        read_csv_rows(sheet_path)?
    } else {
        read_workbook_rows(sheet_path)?
    };

    Ok(AcquiredDocument {
        text: render_aligned(&rows),
        page_images: Vec::new(),
        bold_total_lines: Vec::new(),
    })
}

fn read_workbook_rows(sheet_path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(sheet_path)
        .with_context(|| format!("failed to open spreadsheet {}", sheet_path.display()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let Some(first_sheet) = sheet_names.first() else {
        bail!("spreadsheet has no sheets: {}", sheet_path.display());
    };

    let range = workbook
        .worksheet_range(first_sheet)
        .with_context(|| format!("failed to read sheet {first_sheet}"))?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_string().unwrap_or_default())
                .collect()
        })
        .collect())
}

fn read_csv_rows(sheet_path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(sheet_path)
        .with_context(|| format!("failed to open csv {}", sheet_path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("failed to read csv {}", sheet_path.display()))?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    Ok(rows)
}

/// Pad cells to per-column width so the text reads like a printed table.
pub(super) fn render_aligned(rows: &[Vec<String>]) -> String {
    let column_count = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    if column_count == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; column_count];
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for (index, width) in widths.iter().enumerate() {
                let cell = row.get(index).map(String::as_str).unwrap_or("");
                line.push_str(cell);
                if index + 1 < column_count {
                    let padding = width.saturating_sub(cell.chars().count()) + 2;
                    line.push_str(&" ".repeat(padding));
                }
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<String>>()
        .join("\n")
}
