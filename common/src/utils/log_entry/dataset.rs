use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetEntry {
    #[error("Split {0}: missing directory {1}, skipping")]
    MissingDirectory(String, String),
    #[error("Split {0}: no image files found")]
    NoImages(String),
    #[error("Skipping {0}: no label file")]
    MissingLabel(String),
    #[error("Bad line in {0}: '{1}'")]
    BadLabelLine(String, String),
    #[error("Could not read image {0}")]
    UnreadableImage(String),
    #[error("Saved {0}")]
    OverlaySaved(String),
    #[error("Split {0}: saved {1} overlay examples to {2}")]
    OverlaysSaved(String, usize, String),
    #[error("Missing dataset yaml: {0}")]
    MissingDatasetYaml(String),
}

impl From<DatasetEntry> for String {
    #[inline(always)]
    fn from(value: DatasetEntry) -> Self {
        value.to_string()
    }
}
