//! synchotic-build library.
//!
//! Build orchestration for the synchotic launcher and app. Exposed as a
//! library so integration tests can drive the pipeline with a fake
//! [`process::Invoker`].

pub mod bridge;
pub mod clean;
pub mod commands;
pub mod common;
pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod finalize;
pub mod packager;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod stage;
pub mod timing;

pub use error::BuildError;
