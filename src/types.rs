use serde::{Deserialize, Serialize};

/// Column names shared by the per-clip `frameAnnotationsBOX.csv` files and
/// the merged split CSVs, in file order.
pub const ANNOTATION_COLUMNS: [&str; 10] = [
    "Filename",
    "Annotation tag",
    "Upper left corner X",
    "Upper left corner Y",
    "Lower right corner X",
    "Lower right corner Y",
    "Origin file",
    "Origin frame number",
    "Origin track",
    "Origin track frame number",
];

// One box annotation row. Provenance columns are kept as raw text so they
// round-trip through the merge untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Annotation tag")]
    pub tag: String,
    #[serde(rename = "Upper left corner X")]
    pub upper_left_x: i64,
    #[serde(rename = "Upper left corner Y")]
    pub upper_left_y: i64,
    #[serde(rename = "Lower right corner X")]
    pub lower_right_x: i64,
    #[serde(rename = "Lower right corner Y")]
    pub lower_right_y: i64,
    #[serde(rename = "Origin file")]
    pub origin_file: String,
    #[serde(rename = "Origin frame number")]
    pub origin_frame_number: String,
    #[serde(rename = "Origin track")]
    pub origin_track: String,
    #[serde(rename = "Origin track frame number")]
    pub origin_track_frame_number: String,
}

impl AnnotationRecord {
    /// The image file name without the clip directory prefix
    /// (`dayTraining/dayClip1--00347.jpg` -> `dayClip1--00347.jpg`).
    ///
    /// Keeps the text after the last separator, so `a/b/c.jpg` gives `c.jpg`
    /// rather than the second component `b`. LISA filenames carry a single
    /// directory, where both readings agree.
    pub fn image_file_name(&self) -> &str {
        match self.filename.rsplit_once(['/', '\\']) {
            Some((_, name)) => name,
            None => &self.filename,
        }
    }
}

/// A named data subset of the LISA dataset
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    pub fn label(self) -> &'static str {
        match self {
            Split::Train => "Train",
            Split::Test => "Test",
        }
    }

    /// Name of the merged CSV written by the merger and read by the converter
    pub fn merged_csv_name(self) -> &'static str {
        match self {
            Split::Train => "training_data.csv",
            Split::Test => "test_data.csv",
        }
    }

    /// Directory under the dataset root holding the split's images
    pub fn image_dir_name(self) -> &'static str {
        match self {
            Split::Train => "train2017",
            Split::Test => "val2017",
        }
    }

    pub fn coco_file_name(self) -> &'static str {
        match self {
            Split::Train => "instances_train2017.json",
            Split::Test => "instances_val2017.json",
        }
    }
}

/// Which tree of the dataset a clip folder path points into
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Subtree {
    /// `<root>/Annotations/Annotations/<clip>`
    Annotations,
    /// `<root>/<clip>`
    Images,
}

/// Statistics reported by the merger for one split
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub files_read: usize,
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub rows_written: usize,
}

impl MergeStats {
    pub fn print_summary(&self, split: Split) {
        log::info!("=== {} Merge Summary ===", split.label());
        log::info!("Files read: {}", self.files_read);
        log::info!("Rows read: {}", self.rows_read);
        log::info!("Duplicate rows dropped: {}", self.duplicates_dropped);
        log::info!("Finished processing {} rows", self.rows_written);
    }
}
