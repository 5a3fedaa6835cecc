//! Utility functions and helpers.

pub mod http;

/// Trimmed value of an optional input, `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
