//! batedor: terminal dashboard and process wiring around the batedor_agent pipeline.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod ui;
