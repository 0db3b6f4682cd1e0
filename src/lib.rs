//! Activity heatmap and streak engine for the terminal.
//! Reads a snapshot of dated activity counts and turns it into a GitHub style contribution
//! calendar, intensity levels, month labels and a day streak. Every snapshot is recomputed from
//! scratch, so the output only depends on the records and the evaluation date.
//!

pub mod activity;
pub mod cli;
pub mod error;
pub mod progress;
pub mod render;
pub mod storage;
pub mod utils;
pub mod watch;
