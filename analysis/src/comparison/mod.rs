pub mod comparator;
pub mod summary;
