//! I/O helpers: model access, configuration, prompt rendering.

pub mod config;
pub mod model;
pub mod prompt;
