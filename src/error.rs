use std::path::PathBuf;

/// Errors raised while merging clip annotations or building COCO files.
///
/// Every variant is fatal: the pipeline stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("invalid image glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("row {row}: no listed image named '{file_name}'")]
    ImageNotFound { row: usize, file_name: String },

    #[error("row {row}: {count} listed images are named '{file_name}'")]
    AmbiguousImage {
        row: usize,
        file_name: String,
        count: usize,
    },

    #[error("row {row}: no category named '{tag}'")]
    CategoryNotFound { row: usize, tag: String },

    #[error("row {row}: degenerate bounding box {bbox:?}")]
    DegenerateBox { row: usize, bbox: [i64; 4] },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}
