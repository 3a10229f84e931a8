//! Settings come from a TOML file overlaid with `PASSPORT_*` environment
//! variables. See `bin/settings_demo.rs` for a manual check.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
