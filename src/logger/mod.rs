//! Tracing setup: a bootstrap subscriber whose filter is swapped once
//! settings are loaded. See `bin/logger_demo.rs` for a manual check.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
