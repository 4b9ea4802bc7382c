use crate::detection::bounding_box::{BoundingBox, BoxSet};
use crate::detection::geometry::iou;
use serde::{Deserialize, Serialize};

/// IoU cutoffs used when reconciling two box sets.
///
/// `iou_match` decides cross-method equivalence, `iou_dup` decides
/// within-method duplicates. They are independent.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct MatchThreshold {
    pub iou_match: f64,
    pub iou_dup: f64,
}

impl Default for MatchThreshold {
    fn default() -> Self {
        Self {
            iou_match: 0.50,
            iou_dup: 0.80,
        }
    }
}

/// Pairwise overlap queries over box slices.
pub trait PairScan {
    /// Number of unordered pairs `(i, j)`, `i < j`, with IoU at or above `threshold`.
    fn count_overlapping_pairs(&self, boxes: &[BoundingBox], threshold: f64) -> usize;

    /// Number of `candidates` with no box in `reference` at or above `threshold`.
    fn count_unmatched(&self, candidates: &[BoundingBox], reference: &[BoundingBox], threshold: f64) -> usize;
}

/// Brute-force O(n²) scan. Per-image detection counts are in the tens.
#[derive(Debug, Default, Copy, Clone)]
pub struct ExhaustiveScan;

impl PairScan for ExhaustiveScan {
    fn count_overlapping_pairs(&self, boxes: &[BoundingBox], threshold: f64) -> usize {
        boxes.iter()
            .enumerate()
            .map(|(i, a)| boxes[i + 1..].iter().filter(|b| iou(a, b) >= threshold).count())
            .sum()
    }

    fn count_unmatched(&self, candidates: &[BoundingBox], reference: &[BoundingBox], threshold: f64) -> usize {
        candidates.iter()
            .filter(|candidate| !reference.iter().any(|r| iou(candidate, r) >= threshold))
            .count()
    }
}

/// Compares single-shot and tiled detections of one image.
#[derive(Debug, Clone)]
pub struct Reconciler<S: PairScan = ExhaustiveScan> {
    threshold: MatchThreshold,
    scan: S,
}

impl Reconciler<ExhaustiveScan> {
    pub fn new(threshold: MatchThreshold) -> Self {
        Self::with_scan(threshold, ExhaustiveScan)
    }
}

impl<S: PairScan> Reconciler<S> {
    pub fn with_scan(threshold: MatchThreshold, scan: S) -> Self {
        Self { threshold, scan }
    }

    pub fn threshold(&self) -> MatchThreshold {
        self.threshold
    }

    /// Estimated over-detection: pairs within `boxes` at or above `iou_dup`.
    /// An estimate, not a deduplication; the boxes involved are not reported.
    pub fn count_duplicates(&self, boxes: &BoxSet) -> usize {
        self.scan.count_overlapping_pairs(&boxes.boxes, self.threshold.iou_dup)
    }

    /// Boxes of `candidate` that no box of `reference` matches at `iou_match`.
    ///
    /// Only the candidate side is counted, and one reference box may match any
    /// number of candidates. This is the reported metric; do not replace it
    /// with a one-to-one assignment.
    pub fn count_novel(&self, candidate: &BoxSet, reference: &BoxSet) -> usize {
        self.scan.count_unmatched(&candidate.boxes, &reference.boxes, self.threshold.iou_match)
    }
}
