//! Terminal viewer for the arcade cabinet.
//!
//! Provides an interactive terminal view with:
//! - The live tile grid and score
//! - Machine registers and cabinet counters
//! - Run/pause/step/speed controls

mod app;
mod ui;

pub use app::{ViewerApp, run_viewer};
