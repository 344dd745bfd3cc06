//! Command-line host for the offline cache worker

pub mod args;
pub mod commands;
mod native;

pub use args::{Cli, Commands};
pub use native::NativeHost;
