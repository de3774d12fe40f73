//! egui rendering. Everything here reads from [`crate::state::AppState`]
//! and only mutates it through its methods.

pub mod panels;
pub mod plot;
pub mod table;
