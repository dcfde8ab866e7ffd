//! Tabular data source reading (CSV, or TSV by extension).

use certgen_core::{DataSet, Error, Result, Row};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read every row of a CSV/TSV file with a header line.
///
/// Rows shorter than the header are kept; they fail later, when that row
/// is mapped, so one bad line does not stop the batch.
pub fn read_data_source(path: impl AsRef<Path>) -> Result<DataSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::DataSourceError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let delimiter = delimiter_for(path);
    log::debug!(
        "Reading {} with delimiter {:?}",
        path.display(),
        delimiter as char
    );
    read_from(file, delimiter)
}

/// Read rows from any reader using the given field delimiter.
pub fn read_from<R: Read>(reader: R, delimiter: u8) -> Result<DataSet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::DataSourceError(format!("Failed to read header: {}", e)))?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::DataSourceError(format!("Failed to read row: {}", e)))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);
        rows.push(Row::new(line, record.iter()));
    }

    DataSet::new(columns, rows)
}

fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}
