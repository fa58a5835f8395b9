//! Everything that touches the outside world: files, processes, stdout.

pub mod analysis;
pub mod config;
pub mod report;
