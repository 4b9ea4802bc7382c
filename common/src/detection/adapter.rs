//! Converters from detection back-end payloads into [`BoxSet`]s.
//!
//! Whole-image inference reports parallel arrays (`xyxy`, `conf`, `cls`),
//! tiled inference reports a list of object predictions. Both arrive as JSON.

use crate::detection::bounding_box::{BoundingBox, BoxSet, InferenceMethod};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SingleShotPrediction {
    #[serde(default)]
    pub xyxy: Vec<[f64; 4]>,
    #[serde(default)]
    pub conf: Vec<f64>,
    #[serde(default)]
    pub cls: Vec<f64>,
}

impl SingleShotPrediction {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Arrays are paired positionally; surplus entries of longer arrays are ignored.
    pub fn into_box_set(self) -> BoxSet {
        let boxes = self.xyxy.into_iter()
            .zip(self.conf)
            .zip(self.cls)
            .map(|(([x1, y1, x2, y2], confidence), class)| BoundingBox::new(x1, y1, x2, y2, class as i32, confidence))
            .collect();
        BoxSet::new(InferenceMethod::SingleShot, boxes)
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct PredictionBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PredictionCategory {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct PredictionScore {
    pub value: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ObjectPrediction {
    pub bbox: PredictionBox,
    pub category: PredictionCategory,
    pub score: PredictionScore,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct TiledPrediction {
    pub predictions: Vec<ObjectPrediction>,
}

impl TiledPrediction {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Drops predictions scoring below `confidence`.
    pub fn into_box_set(self, confidence: f64) -> BoxSet {
        let boxes = self.predictions.into_iter()
            .filter(|prediction| prediction.score.value >= confidence)
            .map(|prediction| {
                let PredictionBox { minx, miny, maxx, maxy } = prediction.bbox;
                BoundingBox::new(minx, miny, maxx, maxy, prediction.category.id, prediction.score.value)
            })
            .collect();
        BoxSet::new(InferenceMethod::Tiled, boxes)
    }
}

/// Parses `payload` with the adapter that matches `method`.
pub fn extract_box_set(method: InferenceMethod, payload: &str, confidence: f64) -> Result<BoxSet, serde_json::Error> {
    match method {
        InferenceMethod::SingleShot => Ok(SingleShotPrediction::from_json(payload)?.into_box_set()),
        InferenceMethod::Tiled => Ok(TiledPrediction::from_json(payload)?.into_box_set(confidence)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shot_arrays_are_zipped() {
        let payload = r#"{"xyxy": [[1.0, 2.0, 11.0, 22.0], [5, 5, 6, 6]], "conf": [0.9, 0.4], "cls": [2.0, 0.0]}"#;
        let set = extract_box_set(InferenceMethod::SingleShot, payload, 0.25).expect("valid payload");
        assert_eq!(set.method, InferenceMethod::SingleShot);
        assert_eq!(set.boxes, vec![
            BoundingBox::new(1.0, 2.0, 11.0, 22.0, 2, 0.9),
            BoundingBox::new(5.0, 5.0, 6.0, 6.0, 0, 0.4),
        ]);
    }

    #[test]
    fn single_shot_mismatched_arrays_use_shortest() {
        let payload = r#"{"xyxy": [[0, 0, 1, 1], [0, 0, 2, 2]], "conf": [0.5], "cls": [1, 1, 1]}"#;
        let set = extract_box_set(InferenceMethod::SingleShot, payload, 0.0).expect("valid payload");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn single_shot_without_detections_is_empty() {
        let set = extract_box_set(InferenceMethod::SingleShot, "{}", 0.25).expect("valid payload");
        assert!(set.is_empty());
    }

    #[test]
    fn tiled_predictions_below_confidence_are_dropped() {
        let payload = r#"[
            {"bbox": {"minx": 0, "miny": 0, "maxx": 10, "maxy": 10}, "category": {"id": 0, "name": "traffic_light"}, "score": {"value": 0.8}},
            {"bbox": {"minx": 20, "miny": 20, "maxx": 30, "maxy": 30}, "category": {"id": 1}, "score": {"value": 0.1}}
        ]"#;
        let set = extract_box_set(InferenceMethod::Tiled, payload, 0.25).expect("valid payload");
        assert_eq!(set.method, InferenceMethod::Tiled);
        assert_eq!(set.boxes, vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 0.8)]);
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(extract_box_set(InferenceMethod::Tiled, r#"{"bbox": 1}"#, 0.25).is_err());
    }
}
