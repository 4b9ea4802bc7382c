use crate::dataset::yolo_label::{self, YoloLabel};
use crate::render::image_io;
use crate::render::painter::{Painter, GREEN};
use crate::utils::config::{class_name, Config};
use crate::utils::file::{self, LABEL_EXTENSION};
use crate::utils::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EXPLORED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitStatistics {
    pub split: String,
    pub num_images: usize,
    pub num_boxes: usize,
    pub class_counts: BTreeMap<i32, usize>,
}

impl SplitStatistics {
    pub fn average_boxes(&self) -> Option<f64> {
        (self.num_images > 0).then(|| self.num_boxes as f64 / self.num_images as f64)
    }
}

fn label_path(labels_folder: &Path, image: &Path) -> PathBuf {
    labels_folder.join(format!("{}.{}", file::file_stem(image), LABEL_EXTENSION))
}

/// Labels of one image; lines must carry exactly five fields.
async fn read_labels(label_file: &Path) -> Result<Vec<YoloLabel>, LogEntry> {
    Ok(yolo_label::read_label_lines(label_file).await?
        .iter()
        .filter_map(|line| YoloLabel::parse_exact(line))
        .collect())
}

pub async fn split_statistics(split: &str, images: &[PathBuf], labels_folder: &Path) -> Result<SplitStatistics, LogEntry> {
    let mut statistics = SplitStatistics {
        split: split.to_string(),
        num_images: images.len(),
        ..SplitStatistics::default()
    };
    for image in images {
        let label_file = label_path(labels_folder, image);
        if !label_file.is_file() {
            continue;
        }
        for label in read_labels(&label_file).await? {
            statistics.num_boxes += 1;
            *statistics.class_counts.entry(label.class_id).or_insert(0) += 1;
        }
    }
    Ok(statistics)
}

/// Overlays the labels of a seeded shuffle of `images`; returns saved paths.
pub async fn save_overlays(
    config: &Config,
    painter: &Arc<Painter>,
    images: &[PathBuf],
    labels_folder: &Path,
    output_folder: &Path,
) -> Result<Vec<PathBuf>, LogEntry> {
    file::create_folder(output_folder).await?;
    let mut saved = Vec::new();
    for image_path in file::shuffled(images, config.random_seed).iter().take(config.exploration.num_visualize) {
        let image = match image_io::read_rgb(image_path).await {
            Ok(image) => image,
            Err(entry) => {
                logging_warning!(DatasetEntry::UnreadableImage(image_path.display().to_string()), entry.message);
                continue;
            }
        };
        let label_file = label_path(labels_folder, image_path);
        let labels = if label_file.is_file() { read_labels(&label_file).await? } else { Vec::new() };
        let boxes: Vec<_> = labels.iter()
            .map(|label| label.to_pixel_box(image.width(), image.height()))
            .collect();
        let class_names = config.class_names.clone();
        let image = Painter::annotate(painter, image, boxes, GREEN, move |bounding_box| class_name(&class_names, bounding_box.class_id)).await?;
        let target = output_folder.join(file::file_name(image_path));
        image_io::write_rgb(image, &target).await?;
        saved.push(target);
    }
    Ok(saved)
}

pub async fn explore(config: &Config, painter: &Arc<Painter>) -> Result<Vec<SplitStatistics>, LogEntry> {
    let output_root = config.resolve(&config.exploration.output_folder);
    let mut all_statistics = Vec::new();
    for split in &config.splits {
        let images_folder = config.split_images(split);
        let labels_folder = config.split_labels(split);
        if !file::is_directory(&images_folder).await {
            logging_warning!(DatasetEntry::MissingDirectory(split.clone(), images_folder.display().to_string()));
            continue;
        }
        let images = file::list_files(&images_folder, |path| file::has_exact_extension(path, &EXPLORED_EXTENSIONS)).await?;
        let statistics = split_statistics(split, &images, &labels_folder).await?;
        log_statistics(config, &statistics).await;
        if images.is_empty() {
            logging_warning!(DatasetEntry::NoImages(split.clone()));
        } else {
            let output_folder = output_root.join(split);
            let saved = save_overlays(config, painter, &images, &labels_folder, &output_folder).await?;
            logging_information!(DatasetEntry::OverlaysSaved(split.clone(), saved.len(), output_folder.display().to_string()));
        }
        all_statistics.push(statistics);
    }
    Ok(all_statistics)
}

async fn log_statistics(config: &Config, statistics: &SplitStatistics) {
    let class_counts = statistics.class_counts.iter()
        .map(|(class_id, count)| format!("{}={}", config.class_name(*class_id), count))
        .collect::<Vec<_>>()
        .join(", ");
    logging_information!(format!(
        "Split {}: images={} boxes={} classes=[{}]",
        statistics.split, statistics.num_images, statistics.num_boxes, class_counts
    ));
    if let Some(average) = statistics.average_boxes() {
        logging_information!(format!("Split {}: average boxes per image {:.3}", statistics.split, average));
    }
}
