// Brandmark: branding filter graphs for short-form video

pub mod brand;
pub mod config;
pub mod constants;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod media;
pub mod overlay;
