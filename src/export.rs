//! CSV Export
//!
//! Writes the stacked dataset as one row per date:
//!
//! ```text
//! Timestamp,Date,Ethereum,BSC
//! 1609804800,05/01/2021,75,25
//! 1609891200,06/01/2021,60,
//! ```
//!
//! A chain without data on a date gets an empty field.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::aggregate::StackedDataset;
use crate::present::format::csv_date;

/// Default name of the downloaded file
pub const DEFAULT_CSV_FILENAME: &str = "chains.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Write the dataset as CSV, columns in `chains` order
pub fn write_csv<W: Write>(writer: W, dataset: &StackedDataset, chains: &[String]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let header = ["Timestamp", "Date"]
        .into_iter()
        .map(str::to_string)
        .chain(chains.iter().cloned());
    csv.write_record(header)?;

    let mut rows: Vec<_> = dataset.rows.iter().collect();
    rows.sort_by_key(|row| row.date);

    for row in rows {
        let mut record = Vec::with_capacity(chains.len() + 2);
        record.push(row.date.to_string());
        record.push(csv_date(row.date));
        for chain in chains {
            record.push(row.get(chain).map(|v| v.to_string()).unwrap_or_default());
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Render the CSV into a string
pub fn to_csv_string(dataset: &StackedDataset, chains: &[String]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, dataset, chains)?;
    Ok(String::from_utf8(buf)?)
}

/// Write the CSV to a file
pub fn export_to_file(path: &Path, dataset: &StackedDataset, chains: &[String]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, dataset, chains)?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "Exported chains CSV");
    Ok(())
}
