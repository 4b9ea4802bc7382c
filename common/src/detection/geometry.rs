use crate::detection::bounding_box::BoundingBox;

const UNION_EPSILON: f64 = 1e-9;

/// Intersection over union of two boxes.
///
/// Total over any input: negative extents clamp to zero area, and the
/// epsilon in the denominator keeps two degenerate boxes at 0.0.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let inter_w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let inter_h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = inter_w * inter_h;
    let union = a.area() + b.area() - intersection + UNION_EPSILON;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2, 0, 1.0)
    }

    #[test]
    fn identical_boxes_have_unit_iou() {
        let a = bbox(3.0, 4.0, 20.0, 30.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(10.0, 0.0, 20.0, 10.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn degenerate_boxes_yield_zero() {
        let point = bbox(5.0, 5.0, 5.0, 5.0);
        assert_eq!(iou(&point, &point), 0.0);
        let inverted = bbox(10.0, 10.0, 0.0, 0.0);
        assert_eq!(iou(&inverted, &bbox(0.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn shifted_box_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(1.0, 1.0, 11.0, 11.0);
        let expected = 81.0 / 119.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-9);
    }
}
