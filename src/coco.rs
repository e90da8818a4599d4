//! COCO format data structures and box geometry
//!
//! Field order of every struct matches the key order of the written JSON.

use serde::{Deserialize, Serialize};

use crate::types::AnnotationRecord;

/// COCO dataset information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: u32,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            description: "LISA Traffic Sign Dataset".to_string(),
            url: "http://cvrr.ucsd.edu/LISA/lisa-traffic-sign-dataset.html".to_string(),
            version: "2.0".to_string(),
            year: 2018,
        }
    }
}

/// COCO license information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub url: String,
    pub id: u32,
    pub name: String,
}

impl Default for License {
    fn default() -> Self {
        Self {
            url: "https://creativecommons.org/licenses/by-nc-sa/4.0/".to_string(),
            id: 1,
            name: "CC BY-NC-SA 4.0".to_string(),
        }
    }
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub license: u32,
    pub file_name: String,
    pub height: u32,
    pub width: u32,
    pub id: u32,
}

impl Image {
    pub fn new(id: u32, file_name: String, width: u32, height: u32, license: u32) -> Self {
        Self {
            license,
            file_name,
            height,
            width,
            id,
        }
    }
}

/// COCO category information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub supercategory: String,
    pub id: u32,
    pub name: String,
}

/// COCO annotation information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub segmentation: Vec<Vec<i64>>,
    pub area: i64,
    pub iscrowd: u32,
    pub image_id: u32,
    pub bbox: [i64; 4], // [x, y, width, height]
    pub category_id: u32,
    pub id: u32,
}

/// Complete COCO dataset structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: Info,
    pub licenses: Vec<License>,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl Default for CocoFile {
    fn default() -> Self {
        Self {
            info: Info::default(),
            licenses: vec![License::default()],
            images: Vec::new(),
            annotations: Vec::new(),
            categories: Vec::new(),
        }
    }
}

/// Axis-aligned box given by its upper-left and lower-right pixel corners.
///
/// Pixel space has its origin at the upper-left of the image with Y growing
/// downward, so a valid box has `lower_right >= upper_left` on both axes.
/// Nothing here enforces that; inverted boxes give zero or negative sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxCorners {
    pub upper_left_x: i64,
    pub upper_left_y: i64,
    pub lower_right_x: i64,
    pub lower_right_y: i64,
}

impl BoxCorners {
    pub fn new(upper_left_x: i64, upper_left_y: i64, lower_right_x: i64, lower_right_y: i64) -> Self {
        Self {
            upper_left_x,
            upper_left_y,
            lower_right_x,
            lower_right_y,
        }
    }

    // Width, height and area saturate at the i64 bounds instead of overflowing.
    pub fn width(&self) -> i64 {
        self.lower_right_x.saturating_sub(self.upper_left_x)
    }

    pub fn height(&self) -> i64 {
        self.lower_right_y.saturating_sub(self.upper_left_y)
    }

    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// `[x, y, width, height]` with `(x, y)` the upper-left corner
    pub fn bbox(&self) -> [i64; 4] {
        [self.upper_left_x, self.upper_left_y, self.width(), self.height()]
    }

    /// Single polygon with corners ordered upper-left, upper-right,
    /// lower-left, lower-right
    pub fn segmentation(&self) -> Vec<Vec<i64>> {
        vec![vec![
            self.upper_left_x,
            self.upper_left_y,
            self.lower_right_x,
            self.upper_left_y,
            self.upper_left_x,
            self.lower_right_y,
            self.lower_right_x,
            self.lower_right_y,
        ]]
    }

    /// True when the box has no positive extent on some axis
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

impl From<&AnnotationRecord> for BoxCorners {
    fn from(record: &AnnotationRecord) -> Self {
        Self::new(
            record.upper_left_x,
            record.upper_left_y,
            record.lower_right_x,
            record.lower_right_y,
        )
    }
}
