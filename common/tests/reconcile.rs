use common::detection::bounding_box::{BoundingBox, BoxSet, InferenceMethod};
use common::detection::geometry::iou;
use common::detection::reconcile::{MatchThreshold, Reconciler};

fn tiled(boxes: &[(f64, f64, f64, f64)]) -> BoxSet {
    let boxes = boxes.iter()
        .map(|&(x1, y1, x2, y2)| BoundingBox::new(x1, y1, x2, y2, 0, 0.5))
        .collect();
    BoxSet::new(InferenceMethod::Tiled, boxes)
}

fn single(boxes: &[(f64, f64, f64, f64)]) -> BoxSet {
    let mut set = tiled(boxes);
    set.method = InferenceMethod::SingleShot;
    set
}

#[test]
fn iou_of_box_with_itself_is_one() {
    for &(x1, y1, x2, y2) in &[(0.0, 0.0, 1.0, 1.0), (12.5, 3.0, 40.0, 90.25), (-5.0, -5.0, 5.0, 5.0)] {
        let a = BoundingBox::new(x1, y1, x2, y2, 0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn iou_of_disjoint_boxes_is_zero() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 1.0);
    let b = BoundingBox::new(50.0, 50.0, 60.0, 70.0, 0, 1.0);
    assert_eq!(iou(&a, &b), 0.0);
}

#[test]
fn iou_is_symmetric() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 1.0);
    let b = BoundingBox::new(4.0, 2.0, 17.0, 9.0, 1, 0.3);
    assert_eq!(iou(&a, &b), iou(&b, &a));
}

#[test]
fn no_duplicates_among_non_overlapping_boxes() {
    let reconciler = Reconciler::new(MatchThreshold::default());
    let set = tiled(&[(0.0, 0.0, 10.0, 10.0), (20.0, 0.0, 30.0, 10.0), (0.0, 20.0, 10.0, 30.0), (40.0, 40.0, 45.0, 45.0)]);
    assert_eq!(reconciler.count_duplicates(&set), 0);
}

#[test]
fn identical_boxes_form_every_pair() {
    let reconciler = Reconciler::new(MatchThreshold::default());
    for k in 0..6usize {
        let set = tiled(&vec![(5.0, 5.0, 25.0, 25.0); k]);
        assert_eq!(reconciler.count_duplicates(&set), k * k.saturating_sub(1) / 2);
    }
}

#[test]
fn subset_candidates_are_not_novel() {
    let reconciler = Reconciler::new(MatchThreshold::default());
    let reference = single(&[(0.0, 0.0, 10.0, 10.0), (30.0, 30.0, 40.0, 40.0), (60.0, 0.0, 70.0, 15.0)]);
    let candidate = tiled(&[(30.0, 30.0, 40.0, 40.0), (0.0, 0.0, 10.0, 10.0)]);
    assert_eq!(reconciler.count_novel(&candidate, &reference), 0);
}

#[test]
fn fully_disjoint_candidates_are_all_novel() {
    let reconciler = Reconciler::new(MatchThreshold::default());
    let reference = single(&[(0.0, 0.0, 10.0, 10.0)]);
    let candidate = tiled(&[(100.0, 100.0, 110.0, 110.0), (200.0, 0.0, 210.0, 10.0), (0.0, 200.0, 5.0, 205.0)]);
    assert_eq!(reconciler.count_novel(&candidate, &reference), candidate.len());
}

#[test]
fn only_the_unmatched_tiled_box_is_novel() {
    let reconciler = Reconciler::new(MatchThreshold { iou_match: 0.5, iou_dup: 0.8 });
    let reference = BoxSet::new(InferenceMethod::SingleShot, vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 0.9)]);
    let candidate = BoxSet::new(InferenceMethod::Tiled, vec![
        BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 0.8),
        BoundingBox::new(100.0, 100.0, 110.0, 110.0, 0, 0.7),
    ]);
    assert_eq!(reconciler.count_novel(&candidate, &reference), 1);
}

#[test]
fn duplicate_threshold_decides_shifted_pair() {
    let set = tiled(&[(0.0, 0.0, 10.0, 10.0), (1.0, 1.0, 11.0, 11.0)]);
    let strict = Reconciler::new(MatchThreshold { iou_match: 0.5, iou_dup: 0.8 });
    let loose = Reconciler::new(MatchThreshold { iou_match: 0.5, iou_dup: 0.5 });
    assert_eq!(strict.count_duplicates(&set), 0);
    assert_eq!(loose.count_duplicates(&set), 1);
}
