//! JsonDB Interface - command-line front end
//!
//! - cli: argument parsing, configuration, command dispatch

pub mod cli;


pub use cli::{execute, run_cli, Cli, CliError, Commands, FieldArgs, OutputFormat};
