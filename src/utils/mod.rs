//! Utils Module
pub mod telemetry;
pub mod text;

pub use telemetry::init_logging;
pub use text::{contains_ignore_case, truncate_chars};
