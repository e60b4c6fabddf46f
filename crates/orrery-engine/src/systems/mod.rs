pub mod lighting;
pub mod pose;
pub mod render;
