use crate::utils::config::Config;
use crate::utils::file::{self, LABEL_EXTENSION, PAIRING_IMAGE_EXTENSIONS};
use crate::utils::logging::*;

const LISTED_STEMS: usize = 10;

/// Image/label pairing of one split, compared by file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    pub split: String,
    pub num_images: usize,
    pub num_labels: usize,
    pub images_without_labels: Vec<String>,
    pub labels_without_images: Vec<String>,
}

impl StructureReport {
    pub fn is_consistent(&self) -> bool {
        self.images_without_labels.is_empty() && self.labels_without_images.is_empty()
    }
}

/// `None` when the split lacks an `images/` or `labels/` folder.
pub async fn check_split(config: &Config, split: &str) -> Result<Option<StructureReport>, LogEntry> {
    let images_folder = config.split_images(split);
    let labels_folder = config.split_labels(split);
    for folder in [&images_folder, &labels_folder] {
        if !file::is_directory(folder).await {
            logging_warning!(DatasetEntry::MissingDirectory(split.to_string(), folder.display().to_string()));
            return Ok(None);
        }
    }
    let images = file::list_files(&images_folder, |path| file::has_extension(path, &PAIRING_IMAGE_EXTENSIONS)).await?;
    let labels = file::list_files(&labels_folder, |path| file::has_extension(path, &[LABEL_EXTENSION])).await?;
    let image_stems = file::stems(&images);
    let label_stems = file::stems(&labels);
    Ok(Some(StructureReport {
        split: split.to_string(),
        num_images: images.len(),
        num_labels: labels.len(),
        images_without_labels: image_stems.difference(&label_stems).cloned().collect(),
        labels_without_images: label_stems.difference(&image_stems).cloned().collect(),
    }))
}

pub async fn check_structure(config: &Config) -> Result<Vec<StructureReport>, LogEntry> {
    logging_information!(format!("Dataset root: {}", config.dataset_root().display()));
    let mut reports = Vec::new();
    for split in &config.splits {
        if let Some(report) = check_split(config, split).await? {
            log_report(&report).await;
            reports.push(report);
        }
    }
    Ok(reports)
}

async fn log_report(report: &StructureReport) {
    logging_information!(format!("Split {}: {} images, {} labels", report.split, report.num_images, report.num_labels));
    if report.is_consistent() {
        logging_notice!(format!("Split {}: every image has a label and vice versa", report.split));
        return;
    }
    if !report.images_without_labels.is_empty() {
        logging_warning!(
            format!("Split {}: {} images without labels", report.split, report.images_without_labels.len()),
            listed(&report.images_without_labels)
        );
    }
    if !report.labels_without_images.is_empty() {
        logging_warning!(
            format!("Split {}: {} labels without images", report.split, report.labels_without_images.len()),
            listed(&report.labels_without_images)
        );
    }
}

fn listed(stems: &[String]) -> String {
    stems.iter().take(LISTED_STEMS).cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("create folder");
        fs::write(path, b"").expect("write file");
    }

    #[tokio::test]
    async fn stems_pair_regardless_of_extension_case() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut config = Config::default();
        config.project_root = temp.path().to_path_buf();
        let split = temp.path().join("data/bosch/train");
        touch(&split.join("images/a.jpg"));
        touch(&split.join("images/b.PNG"));
        touch(&split.join("images/c.bmp"));
        touch(&split.join("images/notes.md"));
        touch(&split.join("labels/a.txt"));
        touch(&split.join("labels/c.txt"));
        touch(&split.join("labels/d.txt"));
        touch(&split.join("labels/b.TXT"));
        touch(&split.join("labels/e.json"));

        let report = check_split(&config, "train").await.expect("check").expect("split present");
        assert_eq!(report.num_images, 3);
        assert_eq!(report.num_labels, 4);
        assert!(report.images_without_labels.is_empty());
        assert_eq!(report.labels_without_images, vec!["d".to_string()]);
        assert!(!report.is_consistent());
    }

    #[tokio::test]
    async fn split_without_labels_folder_is_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut config = Config::default();
        config.project_root = temp.path().to_path_buf();
        touch(&temp.path().join("data/bosch/valid/images/a.jpg"));
        assert!(check_split(&config, "valid").await.expect("check").is_none());
        assert!(check_structure(&config).await.expect("check").is_empty());
    }
}
