pub mod commands;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ComponentsArgs, ResolveArgs};
pub use output::{OutputFormat, OutputFormatter};
