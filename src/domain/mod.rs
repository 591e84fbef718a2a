//! Core domain types and logic.

pub mod price;
pub mod returns;
pub mod portfolio;
pub mod indicator;
pub mod sentiment;
pub mod watchlist;
pub mod universe;
pub mod settings;
pub mod config_validation;
pub mod error;
