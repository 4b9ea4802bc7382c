use crate::dataset::yolo_label::{self, parse_class_id, LABEL_FIELDS};
use crate::utils::config::Config;
use crate::utils::file::{self, LABEL_EXTENSION};
use crate::utils::logging::*;
use std::collections::BTreeSet;
use std::path::Path;

const LISTED_BAD_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    pub file: String,
    pub line: String,
}

/// Class ids and malformed lines found in one split's label files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelScan {
    pub split: String,
    pub num_files: usize,
    pub num_empty_files: usize,
    pub total_boxes: usize,
    pub unique_ids: BTreeSet<i32>,
    pub bad_lines: Vec<BadLine>,
}

impl LabelScan {
    fn scan_line(&mut self, file_name: &str, line: &str) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.first().filter(|_| fields.len() >= LABEL_FIELDS).and_then(|field| parse_class_id(field)) {
            Some(class_id) => {
                self.unique_ids.insert(class_id);
                self.total_boxes += 1;
            }
            None => self.bad_lines.push(BadLine {
                file: file_name.to_string(),
                line: line.to_string(),
            }),
        }
    }
}

/// A missing folder scans as empty.
pub async fn scan_labels(folder: &Path, split: &str) -> Result<LabelScan, LogEntry> {
    let mut scan = LabelScan {
        split: split.to_string(),
        ..LabelScan::default()
    };
    if !file::is_directory(folder).await {
        logging_warning!(DatasetEntry::MissingDirectory(split.to_string(), folder.display().to_string()));
        return Ok(scan);
    }
    let label_files = file::list_files(folder, |path| file::has_exact_extension(path, &[LABEL_EXTENSION])).await?;
    for label_file in &label_files {
        scan.num_files += 1;
        let lines = yolo_label::read_label_lines(label_file).await?;
        if lines.is_empty() {
            scan.num_empty_files += 1;
            continue;
        }
        let file_name = file::file_name(label_file);
        for line in &lines {
            scan.scan_line(&file_name, line);
        }
    }
    Ok(scan)
}

/// Number of classes a dataset YAML should declare: largest id plus one.
pub fn suggested_class_count(scans: &[LabelScan]) -> Option<i32> {
    all_ids(scans).last().map(|max_id| max_id + 1)
}

pub fn all_ids(scans: &[LabelScan]) -> BTreeSet<i32> {
    scans.iter().flat_map(|scan| scan.unique_ids.iter().copied()).collect()
}

pub async fn check_labels(config: &Config) -> Result<Vec<LabelScan>, LogEntry> {
    let mut scans = Vec::new();
    for split in &config.splits {
        let scan = scan_labels(&config.split_labels(split), split).await?;
        log_scan(&scan).await;
        scans.push(scan);
    }
    let ids = all_ids(&scans);
    logging_information!(format!("All class ids across splits: {:?}", ids));
    match suggested_class_count(&scans) {
        Some(class_count) => logging_notice!(format!("Suggested nc = {}", class_count)),
        None => logging_warning!("No class ids found in any split"),
    }
    Ok(scans)
}

async fn log_scan(scan: &LabelScan) {
    logging_information!(format!(
        "Split {}: files={} empty={} boxes={} class ids={:?}",
        scan.split, scan.num_files, scan.num_empty_files, scan.total_boxes, scan.unique_ids
    ));
    for bad_line in scan.bad_lines.iter().take(LISTED_BAD_LINES) {
        logging_warning!(DatasetEntry::BadLabelLine(bad_line.file.clone(), bad_line.line.clone()));
    }
    if scan.bad_lines.len() > LISTED_BAD_LINES {
        logging_warning!(format!("Split {}: {} more bad lines", scan.split, scan.bad_lines.len() - LISTED_BAD_LINES));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn ids_boxes_and_bad_lines_are_collected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let folder = temp.path().join("labels");
        fs::create_dir_all(&folder).expect("create folder");
        fs::write(folder.join("a.txt"), "0 0.5 0.5 0.1 0.1\n2.0 0.2 0.2 0.1 0.1\n").expect("write");
        fs::write(folder.join("b.txt"), "\n\n").expect("write");
        fs::write(folder.join("c.txt"), "0 0.5 0.5\nred 0.5 0.5 0.1 0.1\n0 0.1 0.1 0.1 0.1\n").expect("write");
        fs::write(folder.join("ignored.json"), "{}").expect("write");

        let scan = scan_labels(&folder, "train").await.expect("scan");
        assert_eq!(scan.num_files, 3);
        assert_eq!(scan.num_empty_files, 1);
        assert_eq!(scan.total_boxes, 3);
        assert_eq!(scan.unique_ids, BTreeSet::from([0, 2]));
        assert_eq!(scan.bad_lines, vec![
            BadLine { file: "c.txt".to_string(), line: "0 0.5 0.5".to_string() },
            BadLine { file: "c.txt".to_string(), line: "red 0.5 0.5 0.1 0.1".to_string() },
        ]);
        assert_eq!(suggested_class_count(&[scan]), Some(3));
    }

    #[tokio::test]
    async fn missing_folder_scans_empty() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let scan = scan_labels(&temp.path().join("absent"), "test").await.expect("scan");
        assert_eq!(scan.num_files, 0);
        assert!(scan.unique_ids.is_empty());
        assert_eq!(suggested_class_count(&[scan]), None);
    }

    #[test]
    fn suggestion_spans_splits() {
        let train = LabelScan { unique_ids: BTreeSet::from([0, 1]), ..LabelScan::default() };
        let valid = LabelScan { unique_ids: BTreeSet::from([4]), ..LabelScan::default() };
        assert_eq!(all_ids(&[train.clone(), valid.clone()]), BTreeSet::from([0, 1, 4]));
        assert_eq!(suggested_class_count(&[train, valid]), Some(5));
    }
}
