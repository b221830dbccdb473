//! Native egui dashboard popup

mod app;
mod theme;

pub use app::{run, DashboardOptions};
