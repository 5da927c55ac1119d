// Excel export: one worksheet per report table

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use lawlist_recon::report::OutputTable;

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;
const MIN_COLUMN_WIDTH: f64 = 10.0;
const MAX_COLUMN_WIDTH: f64 = 80.0;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub rows_exported: usize,
}

/// Write `tables` to a single workbook at `path`.
///
/// Sheets are right-to-left with a bold, frozen header row; columns are
/// sized to their longest value.
pub fn export(tables: &[OutputTable], path: &Path) -> Result<ExportResult, String> {
    let mut result = ExportResult::default();
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for table in tables {
        let name: String = table.name.chars().take(MAX_SHEET_NAME).collect();
        let worksheet = workbook
            .add_worksheet()
            .set_name(&name)
            .map_err(|e| format!("Failed to create sheet '{name}': {e}"))?;
        worksheet.set_right_to_left(true);

        write_sheet(worksheet, table, &header)?;

        result.sheets_exported += 1;
        result.rows_exported += table.rows.len();
    }

    // A workbook needs at least one sheet
    if tables.is_empty() {
        workbook.add_worksheet();
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))?;

    log::debug!(
        "wrote {} sheets ({} rows) to {}",
        result.sheets_exported,
        result.rows_exported,
        path.display()
    );
    Ok(result)
}

fn write_sheet(worksheet: &mut Worksheet, table: &OutputTable, header: &Format) -> Result<(), String> {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, header)
            .map_err(|e| format!("Failed to write header: {e}"))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row32, col as u16, value)
                .map_err(|e| format!("Failed to write cell ({row32}, {col}): {e}"))?;
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width as f64 + 2.0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("Failed to set column width: {e}"))?;
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to freeze header: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn tables() -> Vec<OutputTable> {
        vec![
            OutputTable {
                name: "matched".into(),
                columns: vec!["RuleIndex".into(), "RuleName".into()],
                rows: vec![vec!["17".into(), "חוק הדוגמה".into()]],
            },
            OutputTable {
                name: "missing_from_a".into(),
                columns: vec!["RuleName".into()],
                rows: vec![vec!["חוק זר".into()], vec!["חוק המקרקעין".into()]],
            },
        ]
    }

    #[test]
    fn one_sheet_per_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("report.xlsx");

        let result = export(&tables(), &path).unwrap();
        assert_eq!(result, ExportResult { sheets_exported: 2, rows_exported: 3 });

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["matched", "missing_from_a"]);

        let range = workbook.worksheet_range("matched").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("RuleIndex".into())));
        // indices stay text, never numbers
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("17".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("חוק הדוגמה".into())));

        let range = workbook.worksheet_range("missing_from_a").unwrap();
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn empty_report_still_saves() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.xlsx");
        let result = export(&[], &path).unwrap();
        assert_eq!(result.sheets_exported, 0);
        assert!(path.exists());
    }

    #[test]
    fn long_table_names_are_truncated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("long.xlsx");
        let table = OutputTable {
            name: "a_table_name_that_is_far_too_long_for_excel".into(),
            columns: vec!["RuleName".into()],
            rows: vec![],
        };
        export(&[table], &path).unwrap();
        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names()[0].chars().count(), MAX_SHEET_NAME);
    }
}
