//! Output module for reporting on the job store

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, JobStatistics};
