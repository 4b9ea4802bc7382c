use crate::utils::logging::*;
use common::detection::bounding_box::BoundingBox;
use std::path::Path;
use tokio::fs;

pub const LABEL_FIELDS: usize = 5;

/// One normalised YOLO annotation: `class cx cy w h`, coordinates in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct YoloLabel {
    pub class_id: i32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Class ids may be written as floats (`0.0`); the fractional part is dropped.
pub fn parse_class_id(field: &str) -> Option<i32> {
    field.parse::<f64>().ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i32)
}

impl YoloLabel {
    /// Reads the first five fields; extra trailing fields are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < LABEL_FIELDS {
            return None;
        }
        let class_id = parse_class_id(fields[0])?;
        let mut values = [0_f64; 4];
        for (value, field) in values.iter_mut().zip(&fields[1..LABEL_FIELDS]) {
            *value = field.parse::<f64>().ok()?;
        }
        Some(Self {
            class_id,
            x_center: values[0],
            y_center: values[1],
            width: values[2],
            height: values[3],
        })
    }

    /// Like [`YoloLabel::parse`] but rejects lines with extra fields.
    pub fn parse_exact(line: &str) -> Option<Self> {
        if line.split_whitespace().count() != LABEL_FIELDS {
            return None;
        }
        Self::parse(line)
    }

    /// Pixel corners truncated and clamped into the image.
    pub fn to_pixel_box(&self, image_width: u32, image_height: u32) -> BoundingBox {
        let (width, height) = (image_width as f64, image_height as f64);
        let x_center = self.x_center * width;
        let y_center = self.y_center * height;
        let box_width = self.width * width;
        let box_height = self.height * height;
        let clamp_x = |value: f64| value.trunc().clamp(0.0, (width - 1.0).max(0.0));
        let clamp_y = |value: f64| value.trunc().clamp(0.0, (height - 1.0).max(0.0));
        BoundingBox::new(
            clamp_x(x_center - box_width / 2.0),
            clamp_y(y_center - box_height / 2.0),
            clamp_x(x_center + box_width / 2.0),
            clamp_y(y_center + box_height / 2.0),
            self.class_id,
            1.0,
        )
    }
}

/// Non-blank lines of a label file, trimmed.
pub async fn read_label_lines(path: &Path) -> Result<Vec<String>, LogEntry> {
    let content = fs::read_to_string(path).await
        .map_err(|err| error_entry!(IOEntry::ReadFileError(path.display(), err)))?;
    Ok(content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_class_ids_truncate() {
        assert_eq!(parse_class_id("0"), Some(0));
        assert_eq!(parse_class_id("2.0"), Some(2));
        assert_eq!(parse_class_id("3.9"), Some(3));
        assert_eq!(parse_class_id("light"), None);
        assert_eq!(parse_class_id("nan"), None);
    }

    #[test]
    fn short_or_non_numeric_lines_are_rejected() {
        assert!(YoloLabel::parse("0 0.5 0.5 0.1").is_none());
        assert!(YoloLabel::parse("x 0.5 0.5 0.1 0.1").is_none());
        assert!(YoloLabel::parse("0 0.5 0.5 wide 0.1").is_none());
        assert!(YoloLabel::parse("0 0.5 0.5 0.1 0.1 0.99").is_some());
        assert!(YoloLabel::parse_exact("0 0.5 0.5 0.1 0.1 0.99").is_none());
        assert!(YoloLabel::parse_exact("0 0.5 0.5 0.1 0.1").is_some());
    }

    #[test]
    fn pixel_box_is_clamped_to_image() {
        let label = YoloLabel::parse("1 0.5 0.5 0.5 0.5").expect("valid line");
        let pixel_box = label.to_pixel_box(100, 50);
        assert_eq!((pixel_box.x1, pixel_box.y1, pixel_box.x2, pixel_box.y2), (25.0, 12.0, 75.0, 37.0));
        assert_eq!(pixel_box.class_id, 1);

        let edge = YoloLabel::parse("0 0.0 1.0 0.4 0.4").expect("valid line");
        let pixel_box = edge.to_pixel_box(100, 50);
        assert_eq!((pixel_box.x1, pixel_box.y1, pixel_box.x2, pixel_box.y2), (0.0, 40.0, 20.0, 49.0));
    }

    #[tokio::test]
    async fn blank_lines_are_dropped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("a.txt");
        std::fs::write(&path, "0 0.5 0.5 0.1 0.1\n\n   \n0 0.2 0.2 0.1 0.1\n").expect("write label");
        assert_eq!(read_label_lines(&path).await.expect("read").len(), 2);
    }
}
