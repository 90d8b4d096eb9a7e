use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::allocation::fixed;
use crate::batch::SummaryRow;

const HEADER: [&str; 7] = [
    "student_id",
    "student_name",
    "gpp",
    "gpa",
    "total_credits",
    "extrapolate_gpp",
    "credits_in_pool",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unable to create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write summary CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes summary rows with fixed decimals: 1 for points and credits, 2 for GPA
/// and the projection.
pub fn write_summary<W: Write>(writer: W, rows: &[SummaryRow]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record([
            row.student_id.clone(),
            row.student_name.clone(),
            fixed(row.gpp, 1),
            fixed(row.gpa, 2),
            fixed(row.total_credits, 1),
            fixed(row.extrapolate_gpp, 2),
            fixed(row.credits_in_pool, 1),
        ])?;
    }
    csv_writer
        .flush()
        .map_err(|err| ExportError::Csv(err.into()))?;
    Ok(())
}

pub fn write_summary_path(path: impl AsRef<Path>, rows: &[SummaryRow]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_summary(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "summary exported");
    Ok(())
}
