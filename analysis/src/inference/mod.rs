pub mod backend;
pub mod detector;
pub mod tiled_export;
pub mod training;
