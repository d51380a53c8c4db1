//! Daily GitHub clone traffic collector: discovers repositories from a
//! remote markdown document, snapshots each one's clone counters once per
//! UTC day, and folds the snapshots into per-repository and global summaries.

pub mod cli;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod doctor;
pub mod error;
pub mod logger;
pub mod models;
pub mod store;
pub mod summary;
pub mod traffic;
