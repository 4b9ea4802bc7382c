pub mod adapter;
pub mod bounding_box;
pub mod geometry;
pub mod reconcile;
