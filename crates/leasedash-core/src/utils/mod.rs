//! Utility functions for string formatting and comparison.

pub mod format;

pub use format::{cmp_ignore_case, contains_ignore_case, format_date, truncate_string};
