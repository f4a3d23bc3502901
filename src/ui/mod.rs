// UI and formatting module

pub mod formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_datetime, format_percent, format_report, format_sample, format_size, format_time,
};
