use std::num::ParseIntError;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier of a single person in the dataset.
pub type PersonId = u32;

/// Errors raised while reading or parsing an identity file.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The identity file could not be opened.
    #[error("Failed to open identity file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line did not split into exactly `<filename> <person_id>`.
    #[error("Line {line}: expected 2 whitespace-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },

    /// The person id field was not a non-negative integer.
    #[error("Line {line}: invalid person id {token:?}: {source}")]
    InvalidPersonId {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },

    /// IO error while reading lines.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Filename suffix mapping applied to every filename before it is stored.
///
/// The CelebA identity file lists `.jpg` names while the aligned image set is
/// commonly shipped as `.png`, hence the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRewrite {
    pub from: String,
    pub to: String,
}

impl SuffixRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Replace a trailing `from` with `to`. Names without the suffix pass through.
    pub fn apply(&self, filename: &str) -> String {
        match filename.strip_suffix(self.from.as_str()) {
            Some(stem) if !self.from.is_empty() => format!("{stem}{}", self.to),
            _ => filename.to_string(),
        }
    }
}

impl Default for SuffixRewrite {
    fn default() -> Self {
        Self::new(".jpg", ".png")
    }
}

/// Summary statistics over an identity index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Number of unique persons.
    pub persons: usize,
    /// Total number of image filenames.
    pub images: usize,
    /// Persons with a single image (cannot anchor a triplet).
    pub single_image_persons: usize,
    /// Fewest images held by any person (0 when the index is empty).
    pub min_images_per_person: usize,
    /// Most images held by any person.
    pub max_images_per_person: usize,
}

impl IndexSummary {
    /// Persons able to provide an anchor/positive pair.
    pub fn eligible_persons(&self) -> usize {
        self.persons - self.single_image_persons
    }
}
