use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{AnnotationRecord, ANNOTATION_COLUMNS};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .progress_chars("#>-"),
    );
    pb
}

/// Read every annotation row from a CSV file with a header row.
///
/// Per-clip files use `;` as delimiter, merged split files use `,`.
pub fn read_annotation_csv(path: &Path, delimiter: u8) -> Result<Vec<AnnotationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<AnnotationRecord>, _>>()
        .map_err(|e| Error::csv(path, e))
}

/// Write annotation rows as a comma-delimited CSV with a header row and no index column
pub fn write_annotation_csv(path: &Path, records: &[AnnotationRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    // Explicit header so an empty split still gets one
    writer
        .write_record(ANNOTATION_COLUMNS)
        .map_err(|e| Error::csv(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Create an output directory if it is missing; existing contents are kept
pub fn ensure_output_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        log::debug!("Creating output directory {}", path.display());
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}
