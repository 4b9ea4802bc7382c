use crate::detection::bounding_box::BoxSet;
use crate::detection::reconcile::{PairScan, Reconciler};
use crate::utils::log_entry::io::IOEntry;
use crate::utils::logging::*;
use csv::{Reader, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const IMAGE_REPORT_HEADER: [&str; 5] = ["image", "num_single", "num_sahi", "num_new_sahi_vs_single", "dup_pairs_sahi_est"];

/// One CSV row of a single-shot versus tiled comparison.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub image: String,
    pub num_single: usize,
    pub num_sahi: usize,
    #[serde(rename = "num_new_sahi_vs_single")]
    pub num_new: usize,
    #[serde(rename = "dup_pairs_sahi_est")]
    pub dup_pairs: usize,
}

impl ImageReport {
    /// Novelty is counted for the tiled set against the single-shot set,
    /// duplicates on the tiled set only.
    pub fn reconcile<S: PairScan>(image: impl Into<String>, single: &BoxSet, tiled: &BoxSet, reconciler: &Reconciler<S>) -> Self {
        Self {
            image: image.into(),
            num_single: single.len(),
            num_sahi: tiled.len(),
            num_new: reconciler.count_novel(tiled, single),
            dup_pairs: reconciler.count_duplicates(tiled),
        }
    }
}

/// Appends [`ImageReport`] rows to a CSV file. The header is written on creation.
pub struct ImageReportWriter {
    path: PathBuf,
    writer: Writer<File>,
}

impl ImageReportWriter {
    pub fn create(path: &Path) -> Result<Self, LogEntry> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|err| error_entry!(IOEntry::WriteCsvError(path.display(), err)))?;
        writer.write_record(IMAGE_REPORT_HEADER)
            .map_err(|err| error_entry!(IOEntry::WriteCsvError(path.display(), err)))?;
        writer.flush()
            .map_err(|err| error_entry!(IOEntry::WriteFileError(path.display(), err)))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, report: &ImageReport) -> Result<(), LogEntry> {
        self.writer.serialize(report)
            .map_err(|err| error_entry!(IOEntry::WriteCsvError(self.path.display(), err)))?;
        self.writer.flush()
            .map_err(|err| error_entry!(IOEntry::WriteFileError(self.path.display(), err)))?;
        Ok(())
    }
}

pub fn read_image_reports(path: &Path) -> Result<Vec<ImageReport>, LogEntry> {
    let mut reader = Reader::from_path(path)
        .map_err(|err| error_entry!(IOEntry::ReadCsvError(path.display(), err)))?;
    reader.deserialize::<ImageReport>()
        .map(|row| row.map_err(|err| error_entry!(IOEntry::ReadCsvError(path.display(), err))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::bounding_box::{BoundingBox, InferenceMethod};
    use crate::detection::reconcile::MatchThreshold;

    #[test]
    fn reconcile_counts_novel_tiled_boxes_and_tiled_duplicates() {
        let single = BoxSet::new(InferenceMethod::SingleShot, vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 0.9)]);
        let tiled = BoxSet::new(InferenceMethod::Tiled, vec![
            BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0, 0.8),
            BoundingBox::new(100.0, 100.0, 110.0, 110.0, 0, 0.7),
            BoundingBox::new(100.0, 100.0, 110.0, 110.0, 0, 0.6),
        ]);
        let reconciler = Reconciler::new(MatchThreshold::default());
        let report = ImageReport::reconcile("a.jpg", &single, &tiled, &reconciler);
        assert_eq!(report, ImageReport {
            image: "a.jpg".to_string(),
            num_single: 1,
            num_sahi: 3,
            num_new: 2,
            dup_pairs: 1,
        });
    }

    #[test]
    fn header_is_written_without_rows() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("summary.csv");
        ImageReportWriter::create(&path).expect("create writer");
        let content = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(content.trim_end(), "image,num_single,num_sahi,num_new_sahi_vs_single,dup_pairs_sahi_est");
        assert!(read_image_reports(&path).expect("parse csv").is_empty());
    }

    #[test]
    fn appended_rows_follow_header_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("summary.csv");
        let mut writer = ImageReportWriter::create(&path).expect("create writer");
        let first = ImageReport { image: "b.png".to_string(), num_single: 2, num_sahi: 3, num_new: 1, dup_pairs: 0 };
        let second = ImageReport { image: "a.png".to_string(), num_single: 0, num_sahi: 1, num_new: 1, dup_pairs: 0 };
        writer.append(&first).expect("append");
        writer.append(&second).expect("append");
        drop(writer);
        let content = std::fs::read_to_string(&path).expect("read csv");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "b.png,2,3,1,0");
        assert_eq!(read_image_reports(&path).expect("parse csv"), vec![first, second]);
    }
}
