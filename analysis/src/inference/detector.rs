use crate::inference::backend::Backend;
use crate::utils::config::Config;
use crate::utils::file;
use crate::utils::logging::*;
use common::detection::adapter::extract_box_set;
use common::detection::bounding_box::{BoxSet, InferenceMethod};
use std::path::Path;

/// A back-end bound to an inference method and the adapter for its payload.
#[derive(Debug, Clone)]
pub struct Detector {
    method: InferenceMethod,
    backend: Backend,
    confidence: f64,
}

impl Detector {
    pub fn new(method: InferenceMethod, backend: Backend, confidence: f64) -> Self {
        Self { method, backend, confidence }
    }

    pub fn single_shot(config: &Config) -> Self {
        let backend = Backend::new(config, &config.detection.single_shot);
        Self::new(InferenceMethod::SingleShot, backend, config.detection.confidence)
    }

    pub fn tiled(config: &Config) -> Self {
        let backend = Backend::new(config, &config.detection.tiled);
        Self::new(InferenceMethod::Tiled, backend, config.detection.confidence)
    }

    pub async fn detect(&self, image: &Path) -> Result<BoxSet, LogEntry> {
        let image_name = file::file_name(image);
        let payload = self.backend.predict(image).await
            .map_err(|entry| error_entry!(
                DetectionEntry::DetectorFailed(self.method.to_string(), image_name.clone(), entry.message),
                entry.debug_info
            ))?;
        extract_box_set(self.method, &payload, self.confidence)
            .map_err(|err| error_entry!(DetectionEntry::InvalidPrediction(self.method.to_string(), image_name, err)))
    }
}
