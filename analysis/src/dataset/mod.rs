pub mod exploration;
pub mod labels;
pub mod structure;
pub mod visualize;
pub mod yolo_label;
