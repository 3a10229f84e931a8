//! The `logger` module requires manual verification.
//! See `bin/logger_demo.rs` for a binary demonstrating its usage.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
