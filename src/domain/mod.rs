//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod format;
pub mod fundamentals;
pub mod indicator;
pub mod price;
pub mod scoring;
pub mod screen;
pub mod swing;
pub mod ticker;
pub mod watchlist;
