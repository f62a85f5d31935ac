//! CSV serialization of extracted records.

use crate::error::Result;
use crate::extraction::{Record, RECORD_FIELDS};
use std::io::Write;
use std::path::Path;

/// Write `records` as CSV into any writer. The header row is always written,
/// even for an empty slice; `None` fields become empty cells.
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(RECORD_FIELDS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `records` to the CSV file at `path`, replacing it.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records(std::io::BufWriter::new(file), records)
}

/// Render `records` as a CSV string.
pub fn records_to_csv_string(records: &[Record]) -> Result<String> {
    let mut buf = Vec::new();
    write_records(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
