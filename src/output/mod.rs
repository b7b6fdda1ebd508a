//! Output module for exporting crawl results
//!
//! This module handles:
//! - Serializing URL records to CSV
//! - Printing crawl statistics and breakdowns

mod csv_output;
pub mod stats;

pub use csv_output::{save_to_csv, CSV_HEADER};
pub use stats::print_statistics;
