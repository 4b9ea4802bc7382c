use crate::utils::config::Config;
use crate::utils::logging::*;
use ab_glyph::{FontVec, PxScale};
use common::detection::bounding_box::BoundingBox;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::sync::Arc;
use tokio::{fs, task};

/// Single-shot detections and dataset labels.
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
/// Tiled detections.
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

pub const SINGLE_SHOT_TITLE: &str = "Single-shot (no tiling)";
pub const TILED_TITLE: &str = "SAHI tiling";

const LABEL_GAP: i32 = 6;
const TITLE_MARGIN: i32 = 20;

/// Draws boxes, labels and composites. Without a font only boxes are drawn.
pub struct Painter {
    font: Option<FontVec>,
    font_size: f32,
    border_width: u32,
}

impl Painter {
    pub fn new(font: Option<FontVec>, font_size: f32, border_width: u32) -> Self {
        Self {
            font,
            font_size,
            border_width: border_width.max(1),
        }
    }

    pub async fn load(config: &Config) -> Self {
        let font_path = config.resolve(&config.font_path);
        let font = match fs::read(&font_path).await {
            Ok(font_data) => match FontVec::try_from_vec(font_data) {
                Ok(font) => Some(font),
                Err(err) => {
                    logging_warning!(SystemEntry::FontError(font_path.display().to_string(), err.to_string()));
                    None
                }
            },
            Err(err) => {
                logging_warning!(SystemEntry::FontError(font_path.display().to_string(), err.to_string()));
                None
            }
        };
        Self::new(font, config.font_size, config.border_width)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Outlines each box and writes `label(box)` just above its top edge.
    /// Corners are clamped into the image before drawing.
    pub fn draw_boxes<F>(&self, image: &mut RgbImage, boxes: &[BoundingBox], color: Rgb<u8>, label: F)
    where
        F: Fn(&BoundingBox) -> String,
    {
        let max_x = image.width().saturating_sub(1) as f64;
        let max_y = image.height().saturating_sub(1) as f64;
        for bounding_box in boxes {
            let left = clamp_coordinate(bounding_box.x1.min(bounding_box.x2), max_x);
            let top = clamp_coordinate(bounding_box.y1.min(bounding_box.y2), max_y);
            let right = clamp_coordinate(bounding_box.x1.max(bounding_box.x2), max_x);
            let bottom = clamp_coordinate(bounding_box.y1.max(bounding_box.y2), max_y);
            let base_rectangle = Rect::at(left, top).of_size((right - left).max(1) as u32, (bottom - top).max(1) as u32);
            for i in 0..self.border_width {
                let offset = i.min(i32::MAX as u32) as i32;
                let offset_rect = Rect::at(base_rectangle.left().saturating_sub(offset), base_rectangle.top().saturating_sub(offset))
                    .of_size(base_rectangle.width().saturating_add(i.saturating_mul(2)), base_rectangle.height().saturating_add(i.saturating_mul(2)));
                draw_hollow_rect_mut(image, offset_rect, color);
            }
            self.draw_label(image, left, top, &label(bounding_box), color, self.font_size);
        }
    }

    /// [`Painter::draw_boxes`] on the blocking pool.
    pub async fn annotate<F>(painter: &Arc<Painter>, mut image: RgbImage, boxes: Vec<BoundingBox>, color: Rgb<u8>, label: F) -> Result<RgbImage, LogEntry>
    where
        F: Fn(&BoundingBox) -> String + Send + 'static,
    {
        let painter = painter.clone();
        task::spawn_blocking(move || {
            painter.draw_boxes(&mut image, &boxes, color, label);
            image
        })
        .await
        .map_err(|err| error_entry!(SystemEntry::TaskPanickedError(err)))
    }

    fn draw_label(&self, image: &mut RgbImage, left: i32, top: i32, text: &str, color: Rgb<u8>, size: f32) {
        if let Some(font) = &self.font {
            let scale = PxScale::from(size);
            let (_, text_height) = text_size(scale, font, text);
            let position_y = top.saturating_sub(LABEL_GAP).saturating_sub(text_height.min(i32::MAX as u32) as i32).max(0);
            draw_text_mut(image, color, left, position_y, scale, font, text);
        }
    }

    /// Both panels scaled to `left`'s height, placed left to right, with titles.
    pub fn side_by_side(&self, left: &RgbImage, right: &RgbImage, left_title: &str, right_title: &str) -> RgbImage {
        let height = left.height().max(1);
        let left = Self::scale_to_height(left, height);
        let right = Self::scale_to_height(right, height);
        let mut canvas = RgbImage::new(left.width() + right.width(), height);
        imageops::overlay(&mut canvas, &left, 0, 0);
        imageops::overlay(&mut canvas, &right, left.width() as i64, 0);
        let title_size = self.font_size * 2.0;
        self.draw_title(&mut canvas, TITLE_MARGIN, left_title, title_size);
        self.draw_title(&mut canvas, left.width() as i32 + TITLE_MARGIN, right_title, title_size);
        canvas
    }

    /// Single-shot overlay, tiled overlay and their side-by-side composite.
    pub fn render_comparison(&self, image: &RgbImage, single: &[BoundingBox], tiled: &[BoundingBox]) -> (RgbImage, RgbImage, RgbImage) {
        let mut single_overlay = image.clone();
        self.draw_boxes(&mut single_overlay, single, GREEN, BoundingBox::label);
        let mut tiled_overlay = image.clone();
        self.draw_boxes(&mut tiled_overlay, tiled, RED, BoundingBox::label);
        let composite = self.side_by_side(&single_overlay, &tiled_overlay, SINGLE_SHOT_TITLE, TILED_TITLE);
        (single_overlay, tiled_overlay, composite)
    }

    fn draw_title(&self, image: &mut RgbImage, left: i32, text: &str, size: f32) {
        if let Some(font) = &self.font {
            draw_text_mut(image, WHITE, left, TITLE_MARGIN, PxScale::from(size), font, text);
        }
    }

    fn scale_to_height(image: &RgbImage, height: u32) -> RgbImage {
        if image.height() == height || image.height() == 0 {
            return image.clone();
        }
        let width = (image.width() as u64 * height as u64 / image.height() as u64).max(1) as u32;
        imageops::resize(image, width, height, FilterType::Triangle)
    }
}

fn clamp_coordinate(value: f64, max: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, max) as i32
}
