use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Axis-aligned box in absolute pixel coordinates.
///
/// Producers do not guarantee `x1 < x2` or `y1 < y2`; consumers clamp
/// extents instead of reordering corners.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub class_id: i32,
    pub confidence: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, class_id: i32, confidence: f64) -> Self {
        Self { x1, y1, x2, y2, class_id, confidence }
    }

    #[inline(always)]
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    #[inline(always)]
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    #[inline(always)]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn label(&self) -> String {
        format!("{} {:.2}", self.class_id, self.confidence)
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InferenceMethod {
    SingleShot,
    Tiled,
}

impl Display for InferenceMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceMethod::SingleShot => write!(f, "single-shot"),
            InferenceMethod::Tiled => write!(f, "tiled"),
        }
    }
}

/// Detections for one image produced by one inference method.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSet {
    pub method: InferenceMethod,
    pub boxes: Vec<BoundingBox>,
}

impl BoxSet {
    pub fn new(method: InferenceMethod, boxes: Vec<BoundingBox>) -> Self {
        Self { method, boxes }
    }

    pub fn empty(method: InferenceMethod) -> Self {
        Self::new(method, Vec::new())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundingBox> {
        self.boxes.iter()
    }
}

impl<'a> IntoIterator for &'a BoxSet {
    type Item = &'a BoundingBox;
    type IntoIter = std::slice::Iter<'a, BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}
