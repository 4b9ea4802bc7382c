use serde_json::error::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionEntry {
    #[error("Invalid {0} prediction for {1}: {2}")]
    InvalidPrediction(String, String, SerdeJsonError),
    #[error("Detector {0} failed on {1}: {2}")]
    DetectorFailed(String, String, String),
    #[error("Skipping {0}: {1}")]
    ImageSkipped(String, String),
    #[error("{0}: single={1} sahi={2} new_sahi={3} dup_est={4}")]
    ImageCompared(String, usize, usize, usize, usize),
    #[error("Tiled export progress {0}/{1}")]
    ExportProgress(usize, usize),
    #[error("Trainer exited with code {0}")]
    TrainerExit(i32),
}

impl From<DetectionEntry> for String {
    #[inline(always)]
    fn from(value: DetectionEntry) -> Self {
        value.to_string()
    }
}
