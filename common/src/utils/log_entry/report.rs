use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportEntry {
    #[error("[MISSING] {0}")]
    MissingRun(String),
    #[error("Saved {0} to {1}")]
    ReportSaved(String, String),
}

impl From<ReportEntry> for String {
    #[inline(always)]
    fn from(value: ReportEntry) -> Self {
        value.to_string()
    }
}
