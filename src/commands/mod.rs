//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Build the app or the launcher
//! - `dev` - Build both and stage them into a test directory
//! - `clean` - Remove generated build state

pub mod build;
pub mod clean;
pub mod dev;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use dev::cmd_dev;
