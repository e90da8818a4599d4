//! COCO dataset processing module
//!
//! Turns a merged split CSV plus its image directory into a COCO
//! object-detection file.

use indicatif::ProgressBar;
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::catalog::{build_categories, list_images, CategoryIndex, ImageIndex};
use crate::coco::{Annotation, BoxCorners, Category, CocoFile, Image};
use crate::config::{BoxPolicy, ConvertConfig, ConvertPaths};
use crate::error::{Error, Result};
use crate::types::{AnnotationRecord, Split};
use crate::utils::{create_progress_bar, ensure_output_directory, read_annotation_csv};

/// Build one annotation per merged row, in row order, with ids starting at 1.
///
/// Every row must resolve to exactly one image and one category.
pub fn build_annotations(
    records: &[AnnotationRecord],
    images: &[Image],
    categories: &[Category],
    box_policy: BoxPolicy,
    pb: &ProgressBar,
) -> Result<Vec<Annotation>> {
    let image_index = ImageIndex::new(images);
    let category_index = CategoryIndex::new(categories);

    let mut annotations = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let image_id = image_index.resolve(row, record.image_file_name())?;
        let category_id = category_index.resolve(row, &record.tag)?;

        let corners = BoxCorners::from(record);
        if corners.is_degenerate() {
            match box_policy {
                BoxPolicy::Keep => warn!(
                    "Row {} ({}) has a degenerate box {:?}",
                    row,
                    record.filename,
                    corners.bbox()
                ),
                BoxPolicy::Reject => {
                    return Err(Error::DegenerateBox {
                        row,
                        bbox: corners.bbox(),
                    })
                }
            }
        }

        annotations.push(Annotation {
            segmentation: corners.segmentation(),
            area: corners.area(),
            iscrowd: 0,
            image_id,
            bbox: corners.bbox(),
            category_id,
            id: row as u32,
        });
        pb.inc(1);
    }

    Ok(annotations)
}

/// Assemble a COCO file from a split's merged rows and its listed images
pub fn build_coco_file(
    records: &[AnnotationRecord],
    images: Vec<Image>,
    config: &ConvertConfig,
    pb: &ProgressBar,
) -> Result<CocoFile> {
    let categories = build_categories(records);
    info!("Tags len is: {}", categories.len());

    let annotations = build_annotations(records, &images, &categories, config.box_policy, pb)?;

    Ok(CocoFile {
        images,
        annotations,
        categories,
        ..CocoFile::default()
    })
}

/// Write a COCO file as JSON indented with four spaces
pub fn write_coco_file(path: &Path, coco_file: &CocoFile) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    coco_file.serialize(&mut serializer)?;
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Read a split's merged CSV and image listing and build its COCO file
pub fn build_split(split: Split, paths: &ConvertPaths, config: &ConvertConfig) -> Result<CocoFile> {
    let csv_path = paths.csv_dir.join(split.merged_csv_name());
    let records = read_annotation_csv(&csv_path, b',')?;
    info!("Read {} rows from {}", records.len(), csv_path.display());

    let images = list_images(&paths.dataset_root.join(split.image_dir_name()), config)?;
    info!("Listed {} {} images", images.len(), split.label().to_lowercase());

    let pb = create_progress_bar(records.len() as u64, split.label());
    let coco_file = build_coco_file(&records, images, config, &pb)?;
    pb.finish_with_message(format!("{} processing complete", split.label()));

    Ok(coco_file)
}

/// Write a split's COCO file into the output directory and return its path
pub fn write_split(split: Split, paths: &ConvertPaths, coco_file: &CocoFile) -> Result<PathBuf> {
    ensure_output_directory(&paths.output_dir)?;
    let output_path = paths.output_dir.join(split.coco_file_name());
    write_coco_file(&output_path, coco_file)?;
    info!("Wrote {}", output_path.display());
    Ok(output_path)
}

/// Convert one split and return the path of the written JSON file
pub fn convert_split(split: Split, paths: &ConvertPaths, config: &ConvertConfig) -> Result<PathBuf> {
    let coco_file = build_split(split, paths, config)?;
    write_split(split, paths, &coco_file)
}

/// Build the train and test COCO files, then write both.
///
/// Nothing is written unless both splits build.
pub fn convert_dataset(paths: &ConvertPaths, config: &ConvertConfig) -> Result<Vec<PathBuf>> {
    let built = Split::ALL
        .iter()
        .map(|&split| Ok((split, build_split(split, paths, config)?)))
        .collect::<Result<Vec<_>>>()?;

    built
        .iter()
        .map(|(split, coco_file)| write_split(*split, paths, coco_file))
        .collect()
}
