//! Per-clip annotation merging
//!
//! Reads the `frameAnnotationsBOX.csv` file of every clip folder selected for a
//! split and unions their rows into one table. Rows that are equal in all ten
//! columns collapse to the first occurrence; the output keeps first-seen order,
//! so the merged CSV is byte-identical across runs on the same input.

use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{AnnotationRecord, MergeStats, Split, Subtree};
use crate::utils::{ensure_output_directory, read_annotation_csv, write_annotation_csv};

/// Name of the box-annotation file inside every clip folder
pub const CLIP_ANNOTATION_FILE: &str = "frameAnnotationsBOX.csv";

const DAY_TRAIN_CLIPS: usize = 13;
const NIGHT_TRAIN_CLIPS: usize = 5;

/// Clip folders of a split, relative to the subtree root.
///
/// The selection is fixed: day clips 1-13 plus `daySequence2` for training and
/// `daySequence1` for testing. `include_night` adds the night clips and
/// sequences.
pub fn clip_folder_names(split: Split, include_night: bool) -> Vec<PathBuf> {
    let mut folders = Vec::new();
    match split {
        Split::Train => {
            folders.extend(
                (1..=DAY_TRAIN_CLIPS).map(|i| Path::new("dayTrain").join(format!("dayClip{}", i))),
            );
            if include_night {
                folders.extend(
                    (1..=NIGHT_TRAIN_CLIPS)
                        .map(|i| Path::new("nightTrain").join(format!("nightClip{}", i))),
                );
            }
            folders.push(PathBuf::from("daySequence2"));
            if include_night {
                folders.push(PathBuf::from("nightSequence2"));
            }
        }
        Split::Test => {
            folders.push(PathBuf::from("daySequence1"));
            if include_night {
                folders.push(PathBuf::from("nightSequence1"));
            }
        }
    }
    folders
}

/// Absolute clip folder paths of a split under `dataset_root`
pub fn clip_folders(
    dataset_root: &Path,
    split: Split,
    subtree: Subtree,
    include_night: bool,
) -> Vec<PathBuf> {
    let base = match subtree {
        Subtree::Annotations => dataset_root.join("Annotations").join("Annotations"),
        Subtree::Images => dataset_root.to_path_buf(),
    };
    clip_folder_names(split, include_night)
        .into_iter()
        .map(|folder| base.join(folder))
        .collect()
}

/// Ordered set union of annotation rows keyed by full-row equality
#[derive(Debug, Default, Clone)]
pub struct AnnotationUnion {
    seen: HashSet<AnnotationRecord>,
    rows: Vec<AnnotationRecord>,
}

impl AnnotationUnion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows, keeping only those not already present. Returns how many were new.
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = AnnotationRecord>,
    {
        let before = self.rows.len();
        for record in records {
            if !self.seen.contains(&record) {
                self.seen.insert(record.clone());
                self.rows.push(record);
            }
        }
        self.rows.len() - before
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[AnnotationRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AnnotationRecord> {
        self.rows
    }
}

/// Union the annotation files of the given clip folders in order
pub fn merge_clip_folders(folders: &[PathBuf]) -> Result<(AnnotationUnion, MergeStats)> {
    let mut union = AnnotationUnion::new();
    let mut stats = MergeStats::default();

    for folder in folders {
        if !folder.is_dir() {
            return Err(Error::DirectoryNotFound(folder.clone()));
        }
        let csv_path = folder.join(CLIP_ANNOTATION_FILE);
        let records = read_annotation_csv(&csv_path, b';')?;
        info!(
            "Processing {} file with {} rows.",
            csv_path.display(),
            records.len()
        );

        let read = records.len();
        let added = union.extend(records);
        stats.files_read += 1;
        stats.rows_read += read;
        stats.duplicates_dropped += read - added;
    }

    stats.rows_written = union.len();
    Ok((union, stats))
}

/// Merge one split and write `<output_dir>/<split csv>`
pub fn merge_split(
    dataset_root: &Path,
    split: Split,
    output_dir: &Path,
    include_night: bool,
) -> Result<MergeStats> {
    let folders = clip_folders(dataset_root, split, Subtree::Annotations, include_night);
    let (union, stats) = merge_clip_folders(&folders)?;

    ensure_output_directory(output_dir)?;
    let output_path = output_dir.join(split.merged_csv_name());
    write_annotation_csv(&output_path, union.rows())?;
    info!("Wrote {}", output_path.display());

    Ok(stats)
}

/// Merge the train split, then the test split
pub fn merge_dataset(
    dataset_root: &Path,
    output_dir: &Path,
    include_night: bool,
) -> Result<Vec<(Split, MergeStats)>> {
    Split::ALL
        .iter()
        .map(|&split| {
            let stats = merge_split(dataset_root, split, output_dir, include_night)?;
            stats.print_summary(split);
            Ok((split, stats))
        })
        .collect()
}
