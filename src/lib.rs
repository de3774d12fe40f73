//! Home value index dashboard.
//!
//! [`data`] turns a wide, one-column-per-month CSV into long-form
//! observations and state averages; [`app`], [`state`] and [`ui`] present
//! them with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod state;
pub mod ui;
