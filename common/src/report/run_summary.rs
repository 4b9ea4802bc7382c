use crate::report::image_report::ImageReport;
use crate::utils::log_entry::io::IOEntry;
use crate::utils::logging::*;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregate of one comparison run (one per-image CSV).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run: String,
    pub images: usize,
    pub total_single: usize,
    pub total_sahi: usize,
    pub avg_single: f64,
    pub avg_sahi: f64,
    pub imgs_single_ge1: usize,
    pub imgs_sahi_ge1: usize,
    pub imgs_new_ge1: usize,
    pub total_new: usize,
    pub imgs_dup_ge1: usize,
    pub total_dup_pairs: usize,
}

impl RunSummary {
    pub fn from_reports(run: impl Into<String>, reports: &[ImageReport]) -> Self {
        let images = reports.len();
        let total_single: usize = reports.iter().map(|r| r.num_single).sum();
        let total_sahi: usize = reports.iter().map(|r| r.num_sahi).sum();
        let average = |total: usize| if images == 0 { 0.0 } else { total as f64 / images as f64 };
        Self {
            run: run.into(),
            images,
            total_single,
            total_sahi,
            avg_single: average(total_single),
            avg_sahi: average(total_sahi),
            imgs_single_ge1: reports.iter().filter(|r| r.num_single > 0).count(),
            imgs_sahi_ge1: reports.iter().filter(|r| r.num_sahi > 0).count(),
            imgs_new_ge1: reports.iter().filter(|r| r.num_new > 0).count(),
            total_new: reports.iter().map(|r| r.num_new).sum(),
            imgs_dup_ge1: reports.iter().filter(|r| r.dup_pairs > 0).count(),
            total_dup_pairs: reports.iter().map(|r| r.dup_pairs).sum(),
        }
    }

    pub fn markdown_header() -> String {
        [
            "| Run | Images | Total single | Total SAHI | Avg single | Avg SAHI | Img single≥1 | Img SAHI≥1 | Img new≥1 | Total new | Img dup≥1 | Dup pairs |",
            "|---|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|",
        ].join("\n")
    }

    pub fn markdown_row(&self) -> String {
        format!(
            "| {} | {} | {} | {} | {:.2} | {:.2} | {} | {} | {} | {} | {} | {} |",
            self.run, self.images, self.total_single, self.total_sahi,
            self.avg_single, self.avg_sahi,
            self.imgs_single_ge1, self.imgs_sahi_ge1,
            self.imgs_new_ge1, self.total_new,
            self.imgs_dup_ge1, self.total_dup_pairs,
        )
    }
}

pub fn write_run_summaries(path: &Path, summaries: &[RunSummary]) -> Result<(), LogEntry> {
    let mut writer = Writer::from_path(path)
        .map_err(|err| error_entry!(IOEntry::WriteCsvError(path.display(), err)))?;
    if summaries.is_empty() {
        writer.write_record(["run", "images", "total_single", "total_sahi", "avg_single", "avg_sahi",
                                "imgs_single_ge1", "imgs_sahi_ge1", "imgs_new_ge1", "total_new",
                                "imgs_dup_ge1", "total_dup_pairs"])
            .map_err(|err| error_entry!(IOEntry::WriteCsvError(path.display(), err)))?;
    }
    for summary in summaries {
        writer.serialize(summary)
            .map_err(|err| error_entry!(IOEntry::WriteCsvError(path.display(), err)))?;
    }
    writer.flush()
        .map_err(|err| error_entry!(IOEntry::WriteFileError(path.display(), err)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(num_single: usize, num_sahi: usize, num_new: usize, dup_pairs: usize) -> ImageReport {
        ImageReport { image: "x.jpg".to_string(), num_single, num_sahi, num_new, dup_pairs }
    }

    #[test]
    fn empty_run_averages_to_zero() {
        let summary = RunSummary::from_reports("tile640_ov10", &[]);
        assert_eq!(summary.images, 0);
        assert_eq!(summary.avg_single, 0.0);
        assert_eq!(summary.avg_sahi, 0.0);
    }

    #[test]
    fn totals_and_threshold_counts() {
        let reports = [report(2, 3, 1, 0), report(0, 1, 1, 2), report(1, 0, 0, 0)];
        let summary = RunSummary::from_reports("tile640_ov20", &reports);
        assert_eq!(summary.images, 3);
        assert_eq!(summary.total_single, 3);
        assert_eq!(summary.total_sahi, 4);
        assert!((summary.avg_single - 1.0).abs() < 1e-12);
        assert!((summary.avg_sahi - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.imgs_single_ge1, 2);
        assert_eq!(summary.imgs_sahi_ge1, 2);
        assert_eq!(summary.imgs_new_ge1, 2);
        assert_eq!(summary.total_new, 2);
        assert_eq!(summary.imgs_dup_ge1, 1);
        assert_eq!(summary.total_dup_pairs, 2);
    }

    #[test]
    fn markdown_row_rounds_averages() {
        let summary = RunSummary::from_reports("ov30", &[report(1, 2, 0, 0), report(0, 0, 0, 0), report(0, 0, 0, 0)]);
        assert_eq!(summary.markdown_row(), "| ov30 | 3 | 1 | 2 | 0.33 | 0.67 | 1 | 1 | 0 | 0 | 0 | 0 |");
    }

    #[test]
    fn summaries_are_written_in_column_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("ablation_summary.csv");
        let summary = RunSummary::from_reports("ov10", &[report(2, 2, 0, 1)]);
        write_run_summaries(&path, &[summary]).expect("write summary");
        let content = std::fs::read_to_string(&path).expect("read csv");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "run,images,total_single,total_sahi,avg_single,avg_sahi,imgs_single_ge1,imgs_sahi_ge1,imgs_new_ge1,total_new,imgs_dup_ge1,total_dup_pairs");
        assert_eq!(lines[1], "ov10,1,2,2,2.0,2.0,1,1,0,0,1,1");
    }
}
