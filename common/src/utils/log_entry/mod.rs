pub mod dataset;
pub mod detection;
pub mod io;
pub mod report;
pub mod system;
