pub mod config;
pub mod file;
pub mod logging;
