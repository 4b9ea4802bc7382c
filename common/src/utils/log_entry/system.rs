use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum SystemEntry {
    #[error("Initializing")]
    Initializing,
    #[error("Initialization completed")]
    InitializeComplete,
    #[error("Termination in process")]
    Terminating,
    #[error("Termination completed")]
    TerminateComplete,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration not found, using defaults")]
    ConfigNotFound,
    #[error("Project root: {0}")]
    ProjectRoot(String),
    #[error("Child process execution error: {0}")]
    ChildProcessError(String),
    #[error("Task panic while execution: {0}")]
    TaskPanickedError(JoinError),
    #[error("Unable to load font {0}: {1}")]
    FontError(String, String),
}

impl From<SystemEntry> for String {
    #[inline(always)]
    fn from(value: SystemEntry) -> Self {
        value.to_string()
    }
}
