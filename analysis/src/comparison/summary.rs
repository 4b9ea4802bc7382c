use crate::utils::config::Config;
use crate::utils::file;
use crate::utils::logging::*;
use common::report::image_report::read_image_reports;
use common::report::run_summary::{write_run_summaries, RunSummary};
use std::path::{Path, PathBuf};

/// A run is named after the folder its per-image CSV lives in.
pub fn run_label(csv_path: &Path) -> String {
    csv_path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file::file_stem(csv_path))
}

/// Command-line CSVs replace the configured run list.
pub fn run_files(config: &Config, overrides: &[PathBuf]) -> Vec<PathBuf> {
    let runs: &[PathBuf] = if overrides.is_empty() { &config.summary.runs } else { overrides };
    runs.iter().map(|run| config.resolve(run)).collect()
}

pub async fn summarize_runs(csv_paths: &[PathBuf]) -> Result<Vec<RunSummary>, LogEntry> {
    let mut summaries = Vec::new();
    for csv_path in csv_paths {
        if !csv_path.is_file() {
            logging_warning!(ReportEntry::MissingRun(csv_path.display().to_string()));
            continue;
        }
        let reports = read_image_reports(csv_path)?;
        summaries.push(RunSummary::from_reports(run_label(csv_path), &reports));
    }
    Ok(summaries)
}

pub fn markdown_table(summaries: &[RunSummary]) -> String {
    let mut lines = vec![RunSummary::markdown_header()];
    lines.extend(summaries.iter().map(RunSummary::markdown_row));
    lines.join("\n")
}

pub async fn summarize(config: &Config, overrides: &[PathBuf]) -> Result<Vec<RunSummary>, LogEntry> {
    let summaries = summarize_runs(&run_files(config, overrides)).await?;
    let output_folder = config.resolve(&config.summary.output_folder);
    file::create_folder(&output_folder).await?;
    let output_file = output_folder.join(&config.summary.output_file);
    write_run_summaries(&output_file, &summaries)?;
    logging_notice!(ReportEntry::ReportSaved("run summary".to_string(), output_file.display().to_string()));
    println!("{}", markdown_table(&summaries));
    Ok(summaries)
}
