use crate::dataset::yolo_label::{self, YoloLabel};
use crate::render::image_io;
use crate::render::painter::{Painter, GREEN};
use crate::utils::config::Config;
use crate::utils::file::{self, LABEL_EXTENSION, SAMPLE_IMAGE_EXTENSIONS};
use crate::utils::logging::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn visualize_image(painter: &Arc<Painter>, image_path: &Path, labels_folder: &Path, output_folder: &Path) -> Result<Option<PathBuf>, LogEntry> {
    let stem = file::file_stem(image_path);
    let label_file = labels_folder.join(format!("{}.{}", stem, LABEL_EXTENSION));
    if !label_file.is_file() {
        logging_warning!(DatasetEntry::MissingLabel(file::file_name(image_path)));
        return Ok(None);
    }
    let image = match image_io::read_rgb(image_path).await {
        Ok(image) => image,
        Err(entry) => {
            logging_warning!(DatasetEntry::UnreadableImage(image_path.display().to_string()), entry.message);
            return Ok(None);
        }
    };
    let label_name = file::file_name(&label_file);
    let mut boxes = Vec::new();
    for line in yolo_label::read_label_lines(&label_file).await? {
        match YoloLabel::parse(&line) {
            Some(label) => boxes.push(label.to_pixel_box(image.width(), image.height())),
            None => logging_warning!(DatasetEntry::BadLabelLine(label_name.clone(), line)),
        }
    }
    let image = Painter::annotate(painter, image, boxes, GREEN, |bounding_box| bounding_box.class_id.to_string()).await?;
    let target = output_folder.join(format!("{}_debug.jpg", stem));
    image_io::write_rgb(image, &target).await?;
    logging_information!(DatasetEntry::OverlaySaved(target.display().to_string()));
    Ok(Some(target))
}

/// Draws the raw labels of a few sampled images per split.
pub async fn visualize_split(config: &Config, painter: &Arc<Painter>, split: &str) -> Result<Vec<PathBuf>, LogEntry> {
    let images_folder = config.split_images(split);
    let labels_folder = config.split_labels(split);
    for folder in [&images_folder, &labels_folder] {
        if !file::is_directory(folder).await {
            logging_warning!(DatasetEntry::MissingDirectory(split.to_string(), folder.display().to_string()));
            return Ok(Vec::new());
        }
    }
    let images = file::list_files(&images_folder, |path| file::has_extension(path, &SAMPLE_IMAGE_EXTENSIONS)).await?;
    if images.is_empty() {
        logging_warning!(DatasetEntry::NoImages(split.to_string()));
        return Ok(Vec::new());
    }
    let output_folder = config.resolve(&config.visualize.output_folder).join(split);
    file::create_folder(&output_folder).await?;
    let mut saved = Vec::new();
    for image_path in file::sample(&images, config.visualize.num_samples, config.random_seed) {
        if let Some(target) = visualize_image(painter, &image_path, &labels_folder, &output_folder).await? {
            saved.push(target);
        }
    }
    Ok(saved)
}

pub async fn visualize(config: &Config, painter: &Arc<Painter>) -> Result<Vec<PathBuf>, LogEntry> {
    let mut saved = Vec::new();
    for split in &config.splits {
        saved.extend(visualize_split(config, painter, split).await?);
    }
    Ok(saved)
}
