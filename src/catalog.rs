use glob::{glob, Pattern};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::coco::{Category, Image};
use crate::config::ConvertConfig;
use crate::error::{Error, Result};
use crate::types::AnnotationRecord;

/// List the images of a split directory.
///
/// Only regular files with the configured extension are kept. Files are sorted
/// by name before ids are assigned, so ids are `0..N` and reproducible across
/// platforms. The resolution and license come from the config; the images
/// themselves are never opened.
pub fn list_images(image_dir: &Path, config: &ConvertConfig) -> Result<Vec<Image>> {
    if !image_dir.is_dir() {
        return Err(Error::DirectoryNotFound(image_dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&image_dir.to_string_lossy()),
        config.image_extension
    );
    let mut file_names: Vec<String> = glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();
    file_names.sort();

    Ok(file_names
        .into_iter()
        .enumerate()
        .map(|(id, file_name)| {
            Image::new(
                id as u32,
                file_name,
                config.image_width,
                config.image_height,
                config.license_id,
            )
        })
        .collect())
}

/// Build one category per distinct tag, sorted by name, with ids starting at 1
pub fn build_categories(records: &[AnnotationRecord]) -> Vec<Category> {
    let tags: BTreeSet<&str> = records.iter().map(|record| record.tag.as_str()).collect();
    tags.into_iter()
        .enumerate()
        .map(|(i, tag)| Category {
            supercategory: String::new(),
            id: (i + 1) as u32,
            name: tag.to_string(),
        })
        .collect()
}

/// Maps image file names to the ids of every image carrying that name
pub struct ImageIndex<'a> {
    by_name: HashMap<&'a str, Vec<u32>>,
}

impl<'a> ImageIndex<'a> {
    pub fn new(images: &'a [Image]) -> Self {
        let mut by_name: HashMap<&str, Vec<u32>> = HashMap::with_capacity(images.len());
        for image in images {
            by_name
                .entry(image.file_name.as_str())
                .or_default()
                .push(image.id);
        }
        Self { by_name }
    }

    /// Resolve a row's image by exact file name. `row` is only used for error reporting.
    ///
    /// `AmbiguousImage` needs duplicate names, which `list_images` never yields
    /// from a single directory; only a hand-built image list can trigger it.
    pub fn resolve(&self, row: usize, file_name: &str) -> Result<u32> {
        match self.by_name.get(file_name).map(Vec::as_slice) {
            Some([id]) => Ok(*id),
            Some(ids) if ids.len() > 1 => Err(Error::AmbiguousImage {
                row,
                file_name: file_name.to_string(),
                count: ids.len(),
            }),
            _ => Err(Error::ImageNotFound {
                row,
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// Maps tag names to category ids
pub struct CategoryIndex<'a> {
    by_name: HashMap<&'a str, u32>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            by_name: categories
                .iter()
                .map(|category| (category.name.as_str(), category.id))
                .collect(),
        }
    }

    pub fn resolve(&self, row: usize, tag: &str) -> Result<u32> {
        self.by_name
            .get(tag)
            .copied()
            .ok_or_else(|| Error::CategoryNotFound {
                row,
                tag: tag.to_string(),
            })
    }
}
