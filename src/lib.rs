//! Sales analytics over a Superstore-style transaction table.
//!
//! The library holds the whole data pipeline (load → enrich → filter →
//! aggregate) and its configuration; the `superstore-dashboard` binary is
//! the egui presenter on top of it.

pub mod config;
pub mod data;
pub mod error;
