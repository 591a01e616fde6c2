//! Spreadsheet export: raw log sheet plus statistics sheet.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::report::ReportError;
use crate::report::stats::{ColumnStats, STAT_ROWS};
use crate::report::table::LogTable;

pub const RAW_SHEET: &str = "Raw Log Data";
pub const STATS_SHEET: &str = "Statistics";

/// Writes `table` and `stats` to a new workbook at `path`.
pub fn write_workbook(
    table: &LogTable,
    stats: &[ColumnStats],
    path: &Path,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(RAW_SHEET)?;
        write_raw(sheet, table, &bold)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(STATS_SHEET)?;
        write_stats(sheet, stats, &bold)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_raw(sheet: &mut Worksheet, table: &LogTable, bold: &Format) -> Result<(), ReportError> {
    for (c, name) in table.header.iter().enumerate() {
        sheet.write_string_with_format(0, col(c)?, name, bold)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let r = row_num(r + 1)?;
        for (c, value) in row.iter().enumerate() {
            // Counters become numbers so the sheet can be charted and summed.
            match value.parse::<i64>() {
                Ok(n) => sheet.write_number(r, col(c)?, n as f64)?,
                Err(_) => sheet.write_string(r, col(c)?, value)?,
            };
        }
    }
    sheet.autofit();
    Ok(())
}

fn write_stats(
    sheet: &mut Worksheet,
    stats: &[ColumnStats],
    bold: &Format,
) -> Result<(), ReportError> {
    for (c, column) in stats.iter().enumerate() {
        sheet.write_string_with_format(0, col(c + 1)?, column.name, bold)?;
    }
    for (r, label) in STAT_ROWS.iter().enumerate() {
        let r = row_num(r + 1)?;
        sheet.write_string_with_format(r, 0, *label, bold)?;
        for (c, column) in stats.iter().enumerate() {
            if let Some(value) = column.get(label) {
                sheet.write_number(r, col(c + 1)?, value)?;
            }
        }
    }
    sheet.autofit();
    Ok(())
}

fn row_num(idx: usize) -> Result<u32, ReportError> {
    u32::try_from(idx).map_err(|_| ReportError::TooLarge(format!("row {}", idx)))
}

fn col(idx: usize) -> Result<u16, ReportError> {
    u16::try_from(idx).map_err(|_| ReportError::TooLarge(format!("column {}", idx)))
}
