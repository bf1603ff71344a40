pub mod app;
pub mod completion;
pub mod config;
pub mod dataset;
pub mod editor;
pub mod normalize;
pub mod paths;
