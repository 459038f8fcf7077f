//! topk-tui - live top-K heavy hitters in the terminal
//!
//! Counts labels from a stream in a sliding-window sketch and renders the
//! ranked list next to a braille plot of each item's recent history.

pub mod app;
pub mod canvas;
pub mod config;
pub mod error;
pub mod ingest;
pub mod keys;
pub mod ranked;
pub mod scheduler;
pub mod series;
pub mod sketch;
pub mod tui;

pub use error::{Result, TopkError};
