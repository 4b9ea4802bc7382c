pub mod detection;
pub mod report;
pub mod utils;
