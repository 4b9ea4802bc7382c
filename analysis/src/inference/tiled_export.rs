use crate::inference::detector::Detector;
use crate::render::image_io;
use crate::render::painter::{Painter, RED};
use crate::utils::config::Config;
use crate::utils::file;
use crate::utils::logging::*;
use common::detection::bounding_box::BoundingBox;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PROGRESS_INTERVAL: usize = 10;

/// First `max_images` sorted `.jpg` files; zero keeps them all.
pub async fn export_images(folder: &Path, max_images: usize) -> Result<Vec<PathBuf>, LogEntry> {
    let mut images = file::list_files(folder, |path| file::has_exact_extension(path, &["jpg"])).await?;
    if max_images > 0 {
        images.truncate(max_images);
    }
    Ok(images)
}

async fn export_image(detector: &Detector, painter: &Arc<Painter>, image_path: &Path, output_folder: &Path) -> Result<PathBuf, LogEntry> {
    let image = image_io::read_rgb(image_path).await?;
    let boxes = detector.detect(image_path).await?;
    let image = Painter::annotate(painter, image, boxes.boxes, RED, BoundingBox::label).await?;
    let target = output_folder.join(file::file_name(image_path));
    image_io::write_rgb(image, &target).await?;
    Ok(target)
}

/// Runs the tiled detector over the export folder and saves annotated copies.
pub async fn run_tiled(config: &Config, detector: &Detector, painter: &Arc<Painter>) -> Result<Vec<PathBuf>, LogEntry> {
    let image_folder = config.resolve(&config.tiled_export.image_folder);
    let output_folder = config.resolve(&config.tiled_export.output_folder);
    let images = export_images(&image_folder, config.tiled_export.max_images).await?;
    file::create_folder(&output_folder).await?;
    let mut saved = Vec::new();
    for (index, image_path) in images.iter().enumerate() {
        match export_image(detector, painter, image_path, &output_folder).await {
            Ok(target) => saved.push(target),
            Err(entry) => logging_warning!(DetectionEntry::ImageSkipped(file::file_name(image_path), entry.message), entry.debug_info),
        }
        if (index + 1) % PROGRESS_INTERVAL == 0 {
            logging_information!(DetectionEntry::ExportProgress(index + 1, images.len()));
        }
    }
    logging_notice!(ReportEntry::ReportSaved(format!("{} tiled overlays", saved.len()), output_folder.display().to_string()));
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::BackendSource;
    use image::{Rgb, RgbImage};
    use std::fs;

    #[tokio::test]
    async fn only_sorted_jpgs_up_to_limit() {
        let temp = tempfile::tempdir().expect("create temp dir");
        for name in ["c.jpg", "a.jpg", "b.png", "d.JPG", "e.jpg"] {
            fs::write(temp.path().join(name), b"").expect("write file");
        }
        let images = export_images(temp.path(), 2).await.expect("list");
        let names: Vec<String> = images.iter().map(|path| file::file_name(path)).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert_eq!(export_images(temp.path(), 0).await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn images_without_predictions_are_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut config = Config::default();
        config.project_root = temp.path().to_path_buf();
        config.detection.tiled.source = BackendSource::Precomputed;
        let image_folder = config.resolve(&config.tiled_export.image_folder);
        let prediction_folder = config.resolve(&config.detection.tiled.prediction_folder);
        fs::create_dir_all(&image_folder).expect("create images");
        fs::create_dir_all(&prediction_folder).expect("create predictions");
        for stem in ["a", "b"] {
            RgbImage::from_pixel(24, 24, Rgb([0, 0, 0])).save(image_folder.join(format!("{}.jpg", stem))).expect("write image");
        }
        fs::write(
            prediction_folder.join("a.json"),
            r#"[{"bbox": {"minx": 2, "miny": 2, "maxx": 20, "maxy": 20}, "category": {"id": 0}, "score": {"value": 0.9}}]"#,
        ).expect("write prediction");

        let detector = Detector::tiled(&config);
        let painter = Arc::new(Painter::new(None, 16.0, 2));
        let saved = run_tiled(&config, &detector, &painter).await.expect("export");
        assert_eq!(saved, vec![config.resolve(&config.tiled_export.output_folder).join("a.jpg")]);
    }
}
