//! Stepbar - horizontal step progress bar for terminal UIs
//!
//! The [`engine`] module holds the pure layout and state logic, [`ui`] paints
//! it with ratatui, and [`driver`] is the repeating timer that walks a bar
//! through its steps.

pub mod app;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod ui;

pub use engine::{EngineOptions, Redraw, StepLayoutEngine, StepState};
pub use error::StepError;
