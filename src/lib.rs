//! LISA traffic sign dataset to COCO converter
//!
//! This library merges the per-clip LISA box annotation CSVs into one CSV per
//! split and converts those merged CSVs into COCO object-detection JSON.

pub mod catalog;
pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod error;
pub mod merge;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{BoxPolicy, ConvertArgs, ConvertConfig, ConvertPaths, MergeArgs};
pub use error::{Error, Result};
pub use types::{AnnotationRecord, MergeStats, Split, Subtree};

pub use coco::{BoxCorners, CocoFile};
pub use coco_dataset::{convert_dataset, convert_split};
pub use merge::{merge_dataset, merge_split};
