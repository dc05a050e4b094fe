use std::path::Path;

use anyhow::{Context, Result};

use crate::data::table::TableData;

/// Write a table as CSV with a header row.
pub fn write_csv(table: &TableData, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(&table.columns).context("writing CSV header")?;
    for row in &table.rows {
        writer.write_record(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}
