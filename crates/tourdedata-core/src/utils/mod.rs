//! Utility functions for text, numbers, dates and names.

pub mod dates;
pub mod format;
pub mod names;

// Re-export commonly used functions at module level
pub use dates::{age_on, parse_birthdate, season_age};
pub use format::{column_key, normalize_ws, parse_count, parse_decimal};
pub use names::canonical_rider_name;
