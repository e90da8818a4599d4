use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Every LISA frame is 1280x960; images are never opened to check.
pub const IMAGE_WIDTH: u32 = 1280;
pub const IMAGE_HEIGHT: u32 = 960;
pub const LICENSE_ID: u32 = 1;
pub const IMAGE_EXTENSION: &str = "jpg";

/// Merge the per-clip LISA annotation CSVs into one CSV per split.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct MergeArgs {
    /// Root directory of the LISA dataset
    pub dataset_root: PathBuf,

    /// Directory where training_data.csv and test_data.csv are written
    #[arg(long = "output_dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Also merge the night clips and night sequences
    #[arg(long = "include_night")]
    pub include_night: bool,
}

/// Convert the merged LISA CSVs into COCO object-detection JSON.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ConvertArgs {
    /// Root directory of the LISA dataset (holds train2017/ and val2017/)
    pub dataset_root: PathBuf,

    /// Directory holding training_data.csv and test_data.csv [default: DATASET_ROOT]
    #[arg(long = "csv_dir")]
    pub csv_dir: Option<PathBuf>,

    /// Directory where the instances_*.json files are written
    #[arg(long = "output_dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// What to do with boxes whose lower-right corner is not below and right of the upper-left
    #[arg(long = "degenerate_boxes", value_enum, default_value = "keep")]
    pub degenerate_boxes: BoxPolicy,
}

// Handling of zero or negative width/height boxes
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum BoxPolicy {
    /// Pass the box through unchanged and log a warning
    #[default]
    Keep,
    /// Abort the conversion
    Reject,
}

/// Settings for building COCO entities from merged rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub license_id: u32,
    pub image_extension: String,
    pub box_policy: BoxPolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            image_width: IMAGE_WIDTH,
            image_height: IMAGE_HEIGHT,
            license_id: LICENSE_ID,
            image_extension: IMAGE_EXTENSION.to_string(),
            box_policy: BoxPolicy::default(),
        }
    }
}

/// Input and output locations of a conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertPaths {
    pub dataset_root: PathBuf,
    pub csv_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ConvertArgs {
    pub fn to_convert_config(&self) -> ConvertConfig {
        ConvertConfig {
            box_policy: self.degenerate_boxes,
            ..ConvertConfig::default()
        }
    }

    /// Merged CSVs are read from the dataset root unless `--csv_dir` is given
    pub fn to_convert_paths(&self) -> ConvertPaths {
        ConvertPaths {
            dataset_root: self.dataset_root.clone(),
            csv_dir: self
                .csv_dir
                .clone()
                .unwrap_or_else(|| self.dataset_root.clone()),
            output_dir: self.output_dir.clone(),
        }
    }
}
