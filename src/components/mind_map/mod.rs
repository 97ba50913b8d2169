mod component;
mod download;
mod raster;
mod render;
mod toolbar;

pub use component::MindMapCanvas;
