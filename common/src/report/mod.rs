pub mod image_report;
pub mod run_summary;
