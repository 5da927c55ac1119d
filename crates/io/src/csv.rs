// CSV export: one file per report table

use std::io::Write;
use std::path::{Path, PathBuf};

use lawlist_recon::report::OutputTable;

/// Write one table (header row + rows) to `writer`.
pub fn write_table(table: &OutputTable, writer: impl Write) -> Result<(), String> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(&table.columns)
        .map_err(|e| format!("CSV write error: {e}"))?;
    for row in &table.rows {
        csv.write_record(row)
            .map_err(|e| format!("CSV write error: {e}"))?;
    }

    csv.flush().map_err(|e| format!("CSV flush error: {e}"))?;
    Ok(())
}

/// Write each table to `<dir>/<prefix>_<table>.csv`. Returns the written paths.
pub fn export_dir(tables: &[OutputTable], dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{prefix}_{}.csv", table.name));
        let file = std::fs::File::create(&path)
            .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
        write_table(table, file)?;
        log::debug!("wrote {} rows to {}", table.rows.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
