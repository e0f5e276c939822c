//! Interactive flight search
//!
//! Terminal user interface using Ratatui.

mod app;
mod backend;
mod filters;
mod form;
mod log_pane;
mod results;
mod ui;

pub use app::run;
pub use log_pane::LogBuffer;
